//! The declarative deployment request

use std::path::PathBuf;

use deploy_fs::NormalizedPath;
use deploy_svn::{Credentials, Revision, Secret};
use serde::Deserialize;

use crate::config::DeploySettings;
use crate::{Error, Result};

/// Desired state of a deployment destination.
///
/// Always valid once constructed: the repository URL is non-empty and the
/// destination is a non-empty absolute path. Credentials render masked in
/// `Debug` output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "DeploySettings")]
pub struct DesiredState {
    repo_url: String,
    dest: NormalizedPath,
    revision: Revision,
    export_only: bool,
    force: bool,
    switch: bool,
    credentials: Credentials,
    executable: Option<PathBuf>,
}

impl DesiredState {
    /// Create a request for `repo_url` deployed at `dest`, at HEAD, as a
    /// checkout, without force and with switching enabled.
    pub fn new(repo_url: impl Into<String>, dest: impl Into<NormalizedPath>) -> Result<Self> {
        let repo_url = repo_url.into().trim().to_string();
        let dest = dest.into();

        if repo_url.is_empty() {
            return Err(Error::invalid_request("repository URL must not be empty"));
        }
        if dest.as_str().is_empty() {
            return Err(Error::invalid_request("destination path must not be empty"));
        }
        if !dest.is_absolute() {
            return Err(Error::invalid_request(format!(
                "destination path must be absolute, got '{}'",
                dest
            )));
        }

        Ok(Self {
            repo_url,
            dest,
            revision: Revision::Head,
            export_only: false,
            force: false,
            switch: true,
            credentials: Credentials::default(),
            executable: None,
        })
    }

    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_export(mut self, export_only: bool) -> Self {
        self.export_only = export_only;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_switch(mut self, switch: bool) -> Self {
        self.switch = switch;
        self
    }

    pub fn with_credentials(mut self, username: Option<String>, password: Option<Secret>) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
        self.executable = executable;
        self
    }

    /// Copy of this request pinned to a concrete revision number.
    pub fn pinned(&self, revision: u64) -> Self {
        Self {
            revision: Revision::Number(revision),
            ..self.clone()
        }
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn dest(&self) -> &NormalizedPath {
        &self.dest
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    pub fn export_only(&self) -> bool {
        self.export_only
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn switch(&self) -> bool {
        self.switch
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn executable(&self) -> Option<&PathBuf> {
        self.executable.as_ref()
    }
}

impl TryFrom<DeploySettings> for DesiredState {
    type Error = Error;

    fn try_from(settings: DeploySettings) -> Result<Self> {
        let repo = settings
            .repo
            .ok_or_else(|| Error::invalid_request("missing required option 'repo'"))?;
        let dest = settings
            .dest
            .ok_or_else(|| Error::invalid_request("missing required option 'dest'"))?;

        Ok(Self::new(repo, dest)?
            .with_revision(settings.revision.unwrap_or_default())
            .with_export(settings.export.unwrap_or(false))
            .with_force(settings.force.unwrap_or(false))
            .with_switch(settings.switch.unwrap_or(true))
            .with_credentials(settings.username, settings.password)
            .with_executable(settings.executable))
    }
}

/// Compare repository URLs, ignoring trailing slashes.
pub(crate) fn urls_match(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
