//! Subversion client trait and the `svn` CLI implementation

use std::path::PathBuf;
use std::time::Duration;

use deploy_fs::NormalizedPath;
use serde::Deserialize;

use crate::{CommandOutput, Error, LocalStatus, Result, Revision, Secret, SvnCommand, SvnInfo};

/// Default client binary looked up in PATH.
const DEFAULT_EXECUTABLE: &str = "svn";

/// Authentication passed to every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<Secret>,
}

impl Credentials {
    pub fn new(username: Option<String>, password: Option<Secret>) -> Self {
        Self { username, password }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

/// How to invoke the svn client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Explicit client binary; PATH lookup of `svn` when `None`
    pub executable: Option<PathBuf>,
    pub credentials: Credentials,
    /// Pass `--trust-server-cert`
    pub trust_server_cert: bool,
    /// Wall-clock limit per invocation
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            executable: None,
            credentials: Credentials::default(),
            trust_server_cert: true,
            timeout: None,
        }
    }
}

/// Operations the reconciler needs from a Subversion client.
///
/// Query operations (`info`, `status`) fail on a non-zero exit. Mutating
/// operations return the captured [`CommandOutput`] whatever the exit code
/// so the caller can classify the outcome; they only fail when the client
/// could not be run at all.
pub trait SvnClient: Send + Sync {
    /// `svn info [-r REV] TARGET`, where target is a URL or a working copy.
    fn info(&self, target: &str, revision: Option<&Revision>) -> Result<SvnInfo>;

    /// `svn status --quiet --ignore-externals DEST`
    fn status(&self, dest: &NormalizedPath) -> Result<LocalStatus>;

    /// `svn checkout [--force] -r REV URL DEST`
    fn checkout(
        &self,
        url: &str,
        dest: &NormalizedPath,
        revision: &Revision,
        force: bool,
    ) -> Result<CommandOutput>;

    /// `svn export [--force] -r REV URL DEST`
    fn export(
        &self,
        url: &str,
        dest: &NormalizedPath,
        revision: &Revision,
        force: bool,
    ) -> Result<CommandOutput>;

    /// `svn switch -r REV URL DEST`
    fn switch(&self, url: &str, dest: &NormalizedPath, revision: &Revision)
    -> Result<CommandOutput>;

    /// `svn update -r REV DEST`
    fn update(&self, dest: &NormalizedPath, revision: &Revision) -> Result<CommandOutput>;

    /// `svn revert -R DEST`
    fn revert(&self, dest: &NormalizedPath) -> Result<CommandOutput>;
}

/// [`SvnClient`] backed by the `svn` command-line client.
#[derive(Debug, Clone, Default)]
pub struct SvnCli {
    options: ClientOptions,
}

impl SvnCli {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Resolve the client binary.
    pub fn executable(&self) -> Result<PathBuf> {
        match &self.options.executable {
            Some(path) => Ok(path.clone()),
            None => which::which(DEFAULT_EXECUTABLE).map_err(|_| Error::ExecutableNotFound {
                name: DEFAULT_EXECUTABLE.to_string(),
            }),
        }
    }

    /// Start a command with the global options every invocation carries.
    pub fn command(&self, subcommand: &str) -> Result<SvnCommand> {
        let mut cmd = SvnCommand::new(self.executable()?)
            .arg("--non-interactive")
            .flag_if(self.options.trust_server_cert, "--trust-server-cert")
            .arg("--no-auth-cache");

        let credentials = &self.options.credentials;
        if let Some(username) = &credentials.username {
            cmd = cmd.arg("--username").arg(username.clone());
        }
        if let Some(password) = &credentials.password {
            cmd = cmd.arg("--password").sensitive_arg(password.clone());
        }

        Ok(cmd.arg(subcommand))
    }

    fn run(&self, cmd: SvnCommand) -> Result<CommandOutput> {
        cmd.run(self.options.timeout)
    }
}

impl SvnClient for SvnCli {
    fn info(&self, target: &str, revision: Option<&Revision>) -> Result<SvnInfo> {
        let mut cmd = self.command("info")?;
        if let Some(revision) = revision {
            cmd = cmd.arg("-r").arg(revision.to_string());
        }
        let output = self.run(cmd.arg(target))?.into_result()?;
        SvnInfo::parse(&output.stdout)
    }

    fn status(&self, dest: &NormalizedPath) -> Result<LocalStatus> {
        let cmd = self
            .command("status")?
            .arg("--quiet")
            .arg("--ignore-externals")
            .path_arg(&dest.to_native());
        let output = self.run(cmd)?.into_result()?;
        Ok(LocalStatus::parse(&output.stdout))
    }

    fn checkout(
        &self,
        url: &str,
        dest: &NormalizedPath,
        revision: &Revision,
        force: bool,
    ) -> Result<CommandOutput> {
        let cmd = self
            .command("checkout")?
            .flag_if(force, "--force")
            .arg("-r")
            .arg(revision.to_string())
            .arg(url)
            .path_arg(&dest.to_native());
        self.run(cmd)
    }

    fn export(
        &self,
        url: &str,
        dest: &NormalizedPath,
        revision: &Revision,
        force: bool,
    ) -> Result<CommandOutput> {
        let cmd = self
            .command("export")?
            .flag_if(force, "--force")
            .arg("-r")
            .arg(revision.to_string())
            .arg(url)
            .path_arg(&dest.to_native());
        self.run(cmd)
    }

    fn switch(
        &self,
        url: &str,
        dest: &NormalizedPath,
        revision: &Revision,
    ) -> Result<CommandOutput> {
        let cmd = self
            .command("switch")?
            .arg("-r")
            .arg(revision.to_string())
            .arg(url)
            .path_arg(&dest.to_native());
        self.run(cmd)
    }

    fn update(&self, dest: &NormalizedPath, revision: &Revision) -> Result<CommandOutput> {
        let cmd = self
            .command("update")?
            .arg("-r")
            .arg(revision.to_string())
            .path_arg(&dest.to_native());
        self.run(cmd)
    }

    fn revert(&self, dest: &NormalizedPath) -> Result<CommandOutput> {
        let cmd = self.command("revert")?.arg("-R").path_arg(&dest.to_native());
        self.run(cmd)
    }
}
