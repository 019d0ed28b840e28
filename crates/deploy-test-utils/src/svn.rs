//! In-process Subversion double.
//!
//! [`SimulatedSvn`] implements [`SvnClient`] over an in-memory model of
//! repositories and working copies, mirroring changes to the filesystem so
//! the real `StateInspector` sees what a working copy or export would look
//! like.
//!
//! Realism level: **SIMULATED**. Output lines and error codes follow the
//! real client's C-locale messages, but no repository content is
//! transferred; each checkout or export writes a single `README` file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use deploy_fs::NormalizedPath;
use deploy_svn::{
    CommandOutput, Error, LocalStatus, METADATA_DIR, Result, Revision, SvnClient, SvnInfo,
};

/// Client operations, as recorded in the invocation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Info,
    Status,
    Checkout,
    Export,
    Switch,
    Update,
    Revert,
}

impl Operation {
    /// Whether the operation changes the destination.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Info | Self::Status)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Status => "status",
            Self::Checkout => "checkout",
            Self::Export => "export",
            Self::Switch => "switch",
            Self::Update => "update",
            Self::Revert => "revert",
        }
    }
}

/// One recorded client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub operation: Operation,
    /// Rendered like an `svn` command line, without global options
    pub command: String,
}

#[derive(Debug, Clone)]
enum Injected {
    Exit { code: i32, stderr: String },
    Timeout,
}

#[derive(Debug, Clone)]
struct SimWorkingCopy {
    url: String,
    revision: u64,
    dirty: bool,
}

#[derive(Debug, Default)]
struct State {
    /// Repository root URL -> HEAD revision
    repositories: BTreeMap<String, u64>,
    /// Destination -> working copy
    working_copies: HashMap<String, SimWorkingCopy>,
    invocations: Vec<Invocation>,
    failures: HashMap<Operation, Injected>,
}

impl State {
    fn repository_of(&self, url: &str) -> Option<(&str, u64)> {
        let url = url.trim_end_matches('/');
        self.repositories
            .iter()
            .find(|(root, _)| url == root.as_str() || url.starts_with(&format!("{}/", root)))
            .map(|(root, head)| (root.as_str(), *head))
    }

    fn resolve(&self, url: &str, revision: &Revision, base: Option<u64>) -> std::result::Result<u64, String> {
        let (_, head) = self
            .repository_of(url)
            .ok_or_else(|| format!("svn: E170000: URL '{}' doesn't exist\n", url))?;
        let resolved = match revision {
            Revision::Head | Revision::Date(_) => head,
            Revision::Number(n) => *n,
            Revision::Base | Revision::Committed => base.ok_or_else(requires_working_copy)?,
            Revision::Prev => base.map(|b| b.saturating_sub(1)).ok_or_else(requires_working_copy)?,
        };
        if resolved > head {
            return Err(format!("svn: E160006: No such revision {}\n", resolved));
        }
        Ok(resolved)
    }
}

/// In-memory [`SvnClient`] with an invocation log and failure injection.
///
/// Clones share state, so a test can keep a handle after boxing one into a
/// reconciler.
///
/// # Example
///
/// ```rust,no_run
/// use deploy_test_utils::svn::{Operation, SimulatedSvn};
///
/// let svn = SimulatedSvn::new().with_repository("svn+ssh://host/repo", 12);
/// svn.fail_with(Operation::Update, "svn: E170013: Unable to connect");
/// assert!(svn.invocations().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulatedSvn {
    state: Arc<Mutex<State>>,
}

impl SimulatedSvn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository root with its HEAD revision.
    pub fn with_repository(self, root: &str, head: u64) -> Self {
        self.lock()
            .repositories
            .insert(root.trim_end_matches('/').to_string(), head);
        self
    }

    /// Move a repository's HEAD, as if someone committed.
    ///
    /// # Panics
    /// Panics if the repository was never registered.
    pub fn set_head(&self, root: &str, head: u64) {
        let mut state = self.lock();
        let entry = state
            .repositories
            .get_mut(root.trim_end_matches('/'))
            .unwrap_or_else(|| panic!("set_head: unknown repository {root}"));
        *entry = head;
    }

    /// Register an existing working copy at `dest`, creating its metadata
    /// directory and a `README` on disk.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn seed_working_copy(&self, dest: &NormalizedPath, url: &str, revision: u64) {
        write_tree(dest, true, revision)
            .unwrap_or_else(|e| panic!("seed_working_copy: failed to write {dest}: {e}"));
        self.lock().working_copies.insert(
            dest.as_str().to_string(),
            SimWorkingCopy {
                url: url.to_string(),
                revision,
                dirty: false,
            },
        );
    }

    /// Give the working copy at `dest` a local modification.
    ///
    /// # Panics
    /// Panics if there is no working copy at `dest`.
    pub fn mark_dirty(&self, dest: &NormalizedPath) {
        let mut state = self.lock();
        let wc = state
            .working_copies
            .get_mut(dest.as_str())
            .unwrap_or_else(|| panic!("mark_dirty: no working copy at {dest}"));
        wc.dirty = true;
        let readme = dest.to_native().join("README");
        let _ = fs::write(readme, "locally edited\n");
    }

    /// Make every later call of `operation` exit with code 1 and `stderr`.
    pub fn fail_with(&self, operation: Operation, stderr: &str) {
        self.lock().failures.insert(
            operation,
            Injected::Exit {
                code: 1,
                stderr: stderr.to_string(),
            },
        );
    }

    /// Make every later call of `operation` time out.
    pub fn time_out(&self, operation: Operation) {
        self.lock().failures.insert(operation, Injected::Timeout);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// URL and revision of the working copy at `dest`.
    pub fn working_copy(&self, dest: &NormalizedPath) -> Option<(String, u64)> {
        self.lock()
            .working_copies
            .get(dest.as_str())
            .map(|wc| (wc.url.clone(), wc.revision))
    }

    pub fn is_dirty(&self, dest: &NormalizedPath) -> bool {
        self.lock()
            .working_copies
            .get(dest.as_str())
            .is_some_and(|wc| wc.dirty)
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().invocations.clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.lock().invocations.iter().map(|i| i.operation).collect()
    }

    /// Operations that change the destination, in call order.
    pub fn mutations(&self) -> Vec<Operation> {
        self.operations()
            .into_iter()
            .filter(Operation::is_mutating)
            .collect()
    }

    pub fn clear_invocations(&self) {
        self.lock().invocations.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and apply any injected failure.
    fn begin(&self, operation: Operation, args: &[&str]) -> Result<Option<CommandOutput>> {
        let command = std::iter::once(operation.name())
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");

        let mut state = self.lock();
        state.invocations.push(Invocation {
            operation,
            command: command.clone(),
        });

        match state.failures.get(&operation) {
            None => Ok(None),
            Some(Injected::Timeout) => Err(Error::Timeout {
                command: format!("svn {}", command),
                after: Duration::from_secs(1),
            }),
            Some(Injected::Exit { code, stderr }) => Ok(Some(CommandOutput {
                command: format!("svn {}", command),
                exit_code: Some(*code),
                stdout: String::new(),
                stderr: stderr.clone(),
            })),
        }
    }
}

fn output(operation: Operation, stdout: String) -> CommandOutput {
    CommandOutput {
        command: format!("svn {}", operation.name()),
        exit_code: Some(0),
        stdout,
        stderr: String::new(),
    }
}

fn failure(operation: Operation, stderr: String) -> CommandOutput {
    CommandOutput {
        command: format!("svn {}", operation.name()),
        exit_code: Some(1),
        stdout: String::new(),
        stderr,
    }
}

fn query_failure(operation: Operation, stderr: String) -> Error {
    Error::CommandFailed {
        command: format!("svn {}", operation.name()),
        code: 1,
        stderr,
    }
}

fn requires_working_copy() -> String {
    "svn: E195002: Revision type requires a working copy path, not a URL\n".to_string()
}

fn not_a_working_copy(dest: &str) -> String {
    format!("svn: E155007: '{}' is not a working copy\n", dest)
}

fn has_content(dest: &NormalizedPath) -> bool {
    fs::read_dir(dest.to_native())
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn write_tree(dest: &NormalizedPath, versioned: bool, revision: u64) -> std::io::Result<()> {
    let native = dest.to_native();
    fs::create_dir_all(&native)?;
    if versioned {
        fs::create_dir_all(native.join(METADATA_DIR))?;
        fs::write(native.join(METADATA_DIR).join("wc.db"), "")?;
    }
    fs::write(native.join("README"), format!("revision {}\n", revision))
}

impl SvnClient for SimulatedSvn {
    fn info(&self, target: &str, revision: Option<&Revision>) -> Result<SvnInfo> {
        let rev_arg = revision.map(|r| r.to_string());
        let mut args = Vec::new();
        if let Some(rev) = &rev_arg {
            args.extend(["-r", rev.as_str()]);
        }
        args.push(target);
        if let Some(injected) = self.begin(Operation::Info, &args)? {
            return Err(query_failure(Operation::Info, injected.stderr));
        }

        let state = self.lock();
        let (url, base) = match state.working_copies.get(target) {
            Some(wc) => (wc.url.clone(), Some(wc.revision)),
            None if state.repository_of(target).is_some() => (target.to_string(), None),
            None => return Err(query_failure(Operation::Info, not_a_working_copy(target))),
        };
        let resolved = match revision {
            Some(revision) => state
                .resolve(&url, revision, base)
                .map_err(|stderr| query_failure(Operation::Info, stderr))?,
            None => match base {
                Some(base) => base,
                None => state
                    .resolve(&url, &Revision::Head, None)
                    .map_err(|stderr| query_failure(Operation::Info, stderr))?,
            },
        };
        let (root, _) = state
            .repository_of(&url)
            .ok_or_else(|| query_failure(Operation::Info, format!("svn: E170000: URL '{}' doesn't exist\n", url)))?;

        Ok(SvnInfo {
            url: url.clone(),
            repository_root: Some(root.to_string()),
            revision: resolved,
        })
    }

    fn status(&self, dest: &NormalizedPath) -> Result<LocalStatus> {
        if let Some(injected) = self.begin(Operation::Status, &[dest.as_str()])? {
            return Err(query_failure(Operation::Status, injected.stderr));
        }

        let state = self.lock();
        let wc = state
            .working_copies
            .get(dest.as_str())
            .ok_or_else(|| query_failure(Operation::Status, not_a_working_copy(dest.as_str())))?;

        let modified = if wc.dirty {
            vec!["M       README".to_string()]
        } else {
            Vec::new()
        };
        Ok(LocalStatus { modified })
    }

    fn checkout(
        &self,
        url: &str,
        dest: &NormalizedPath,
        revision: &Revision,
        force: bool,
    ) -> Result<CommandOutput> {
        let rev = revision.to_string();
        let mut args = vec!["-r", rev.as_str(), url, dest.as_str()];
        if force {
            args.insert(0, "--force");
        }
        if let Some(injected) = self.begin(Operation::Checkout, &args)? {
            return Ok(injected);
        }

        let mut state = self.lock();
        let resolved = match state.resolve(url, revision, None) {
            Ok(resolved) => resolved,
            Err(stderr) => return Ok(failure(Operation::Checkout, stderr)),
        };
        if !force && has_content(dest) && !state.working_copies.contains_key(dest.as_str()) {
            return Ok(failure(
                Operation::Checkout,
                format!("svn: E155000: '{}' is already a versioned or obstructed path\n", dest),
            ));
        }
        if let Err(e) = write_tree(dest, true, resolved) {
            return Ok(failure(Operation::Checkout, format!("svn: E000013: {}\n", e)));
        }
        state.working_copies.insert(
            dest.as_str().to_string(),
            SimWorkingCopy {
                url: url.to_string(),
                revision: resolved,
                dirty: false,
            },
        );

        Ok(output(
            Operation::Checkout,
            format!("A    {}/README\nChecked out revision {}.\n", dest, resolved),
        ))
    }

    fn export(
        &self,
        url: &str,
        dest: &NormalizedPath,
        revision: &Revision,
        force: bool,
    ) -> Result<CommandOutput> {
        let rev = revision.to_string();
        let mut args = vec!["-r", rev.as_str(), url, dest.as_str()];
        if force {
            args.insert(0, "--force");
        }
        if let Some(injected) = self.begin(Operation::Export, &args)? {
            return Ok(injected);
        }

        let state = self.lock();
        let resolved = match state.resolve(url, revision, None) {
            Ok(resolved) => resolved,
            Err(stderr) => return Ok(failure(Operation::Export, stderr)),
        };
        if !force && dest.to_native().exists() {
            return Ok(failure(
                Operation::Export,
                "svn: E155000: Destination directory exists; please remove the directory or use --force to overwrite\n".to_string(),
            ));
        }
        if let Err(e) = write_tree(dest, false, resolved) {
            return Ok(failure(Operation::Export, format!("svn: E000013: {}\n", e)));
        }

        Ok(output(
            Operation::Export,
            format!("A    {}/README\nExported revision {}.\n", dest, resolved),
        ))
    }

    fn switch(&self, url: &str, dest: &NormalizedPath, revision: &Revision) -> Result<CommandOutput> {
        let rev = revision.to_string();
        if let Some(injected) = self.begin(Operation::Switch, &["-r", rev.as_str(), url, dest.as_str()])? {
            return Ok(injected);
        }

        let mut state = self.lock();
        let Some(current_url) = state.working_copies.get(dest.as_str()).map(|wc| wc.url.clone()) else {
            return Ok(failure(Operation::Switch, not_a_working_copy(dest.as_str())));
        };
        let same_repository = match (state.repository_of(&current_url), state.repository_of(url)) {
            (Some((a, _)), Some((b, _))) => a == b,
            _ => false,
        };
        if !same_repository {
            return Ok(failure(
                Operation::Switch,
                format!("svn: E195012: Path '{}' does not share common version control ancestry with the requested switch location\n", dest),
            ));
        }
        let resolved = match state.resolve(url, revision, None) {
            Ok(resolved) => resolved,
            Err(stderr) => return Ok(failure(Operation::Switch, stderr)),
        };
        if let Some(wc) = state.working_copies.get_mut(dest.as_str()) {
            wc.url = url.to_string();
            wc.revision = resolved;
        }

        Ok(output(Operation::Switch, format!("Updated to revision {}.\n", resolved)))
    }

    fn update(&self, dest: &NormalizedPath, revision: &Revision) -> Result<CommandOutput> {
        let rev = revision.to_string();
        if let Some(injected) = self.begin(Operation::Update, &["-r", rev.as_str(), dest.as_str()])? {
            return Ok(injected);
        }

        let mut state = self.lock();
        let Some((url, base)) = state
            .working_copies
            .get(dest.as_str())
            .map(|wc| (wc.url.clone(), wc.revision))
        else {
            return Ok(failure(Operation::Update, not_a_working_copy(dest.as_str())));
        };
        let resolved = match state.resolve(&url, revision, Some(base)) {
            Ok(resolved) => resolved,
            Err(stderr) => return Ok(failure(Operation::Update, stderr)),
        };
        if let Some(wc) = state.working_copies.get_mut(dest.as_str()) {
            wc.revision = resolved;
        }

        let stdout = if resolved == base {
            format!("Updating '{}':\nAt revision {}.\n", dest, resolved)
        } else {
            format!("Updating '{}':\nU    {}/README\nUpdated to revision {}.\n", dest, dest, resolved)
        };
        Ok(output(Operation::Update, stdout))
    }

    fn revert(&self, dest: &NormalizedPath) -> Result<CommandOutput> {
        if let Some(injected) = self.begin(Operation::Revert, &["-R", dest.as_str()])? {
            return Ok(injected);
        }

        let mut state = self.lock();
        let Some(wc) = state.working_copies.get_mut(dest.as_str()) else {
            return Ok(failure(Operation::Revert, not_a_working_copy(dest.as_str())));
        };
        let stdout = if wc.dirty {
            wc.dirty = false;
            format!("Reverted '{}/README'\n", dest)
        } else {
            String::new()
        };
        Ok(output(Operation::Revert, stdout))
    }
}
