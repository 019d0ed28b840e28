//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use deploy_core::DeploySettings;
use deploy_svn::{Revision, Secret};

/// svn-deploy - Bring a directory to a Subversion checkout or export
///
/// Does nothing when the destination is already at the requested URL and
/// revision. Exits 0 on success and 1 on any failure.
///
/// Examples:
///   svn-deploy --repo svn+ssh://host/repo/trunk --dest /srv/app
///   svn-deploy --repo svn://host/repo --dest /srv/app -r 1234 --force
///   svn-deploy --config deploy.yaml --check
#[derive(Parser, Debug)]
#[command(name = "svn-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Repository URL
    #[arg(long, visible_alias = "name", alias = "repository")]
    pub repo: Option<String>,

    /// Absolute destination path (relative paths resolve against the current directory)
    #[arg(long)]
    pub dest: Option<String>,

    /// Revision: HEAD, BASE, COMMITTED, PREV, a number or {DATE}
    #[arg(short, long)]
    pub revision: Option<Revision>,

    /// Discard local modifications and overwrite unversioned content
    #[arg(long)]
    pub force: bool,

    /// Export instead of checking out
    #[arg(long)]
    pub export: bool,

    /// Fail instead of switching a working copy on another URL
    #[arg(long)]
    pub no_switch: bool,

    /// Username for the repository
    #[arg(long, env = "SVN_DEPLOY_USERNAME")]
    pub username: Option<String>,

    /// Password for the repository
    #[arg(long, env = "SVN_DEPLOY_PASSWORD", hide_env_values = true)]
    pub password: Option<Secret>,

    /// Path to the svn executable (default: svn in PATH)
    #[arg(long)]
    pub executable: Option<PathBuf>,

    /// Request file (TOML, JSON or YAML) merged under the flags
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds before an svn invocation is killed
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Do not pass --trust-server-cert to svn
    #[arg(long)]
    pub no_trust_server_cert: bool,

    /// Show what would be done without changing anything
    #[arg(long)]
    pub check: bool,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Settings given on the command line; unset flags leave lower layers alone.
    pub fn overrides(&self) -> DeploySettings {
        DeploySettings {
            repo: self.repo.clone(),
            dest: self.dest.clone(),
            revision: self.revision.clone(),
            force: self.force.then_some(true),
            export: self.export.then_some(true),
            switch: self.no_switch.then_some(false),
            username: self.username.clone(),
            password: self.password.clone(),
            executable: self.executable.clone(),
            timeout_secs: self.timeout,
            trust_server_cert: self.no_trust_server_cert.then_some(false),
        }
    }
}
