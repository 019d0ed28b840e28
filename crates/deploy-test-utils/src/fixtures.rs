//! Destination fixtures at three realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs;
//! fakes are faster and need no `svn` binary.

use std::fs;
use std::path::{Path, PathBuf};

use deploy_fs::NormalizedPath;
use tempfile::TempDir;

/// A temporary directory holding deployment destinations and lock files.
///
/// # Example
///
/// ```rust,no_run
/// use deploy_test_utils::fixtures::TestDestination;
///
/// let area = TestDestination::new();
/// let dest = area.dest("app");
/// assert!(!dest.to_native().exists());
/// ```
pub struct TestDestination {
    temp_dir: TempDir,
}

impl Default for TestDestination {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDestination {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute destination path for `name`; nothing is created.
    pub fn dest(&self, name: &str) -> NormalizedPath {
        NormalizedPath::new(self.root().join(name))
    }

    /// Directory for lock files, kept apart from every destination.
    pub fn lock_dir(&self) -> PathBuf {
        self.root().join(".locks")
    }
}

/// Fill `path` with an unversioned file.
///
/// Realism level: **FAKE**. Stands for anything that is neither a working
/// copy nor an export: build output, a hand-made directory.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn foreign_content(path: &Path) {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("foreign_content: failed to create {}: {e}", path.display()));
    fs::write(path.join("notes.txt"), "not under version control\n")
        .unwrap_or_else(|e| panic!("foreign_content: failed to write notes.txt: {e}"));
}

/// Create a bare `.svn` marker directory in `path`.
///
/// Realism level: **FAKE**. Satisfies working copy detection but holds no
/// metadata, so any real client call against it fails.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_working_copy(path: &Path) {
    fs::create_dir_all(path.join(deploy_svn::METADATA_DIR))
        .unwrap_or_else(|e| panic!("fake_working_copy: failed to create .svn: {e}"));
    fs::write(path.join("README"), "versioned\n")
        .unwrap_or_else(|e| panic!("fake_working_copy: failed to write README: {e}"));
}

/// Write an executable `svn` stand-in into `dir` that appends each argument
/// to `dir/args.log` (one per line) and then runs the shell `body`.
///
/// Realism level: **REAL process**. Exercises spawning, environment,
/// argument order and exit codes without Subversion installed.
///
/// # Panics
/// Panics if the filesystem operations fail.
#[cfg(unix)]
pub fn scripted_svn(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("svn");
    let log = dir.join("args.log");
    let content = format!(
        "#!/bin/sh\nfor a in \"$@\"; do echo \"$a\" >> '{}'; done\n{}\n",
        log.display(),
        body
    );
    fs::write(&script, content)
        .unwrap_or_else(|e| panic!("scripted_svn: failed to write script: {e}"));
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
        .unwrap_or_else(|e| panic!("scripted_svn: failed to make script executable: {e}"));
    script
}

/// Arguments logged by a [`scripted_svn`] stand-in, across all its calls.
pub fn logged_args(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("args.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
