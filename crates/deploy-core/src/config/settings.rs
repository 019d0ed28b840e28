//! Layerable deployment settings

use std::path::PathBuf;
use std::time::Duration;

use deploy_svn::{ClientOptions, Credentials, Revision, Secret};
use serde::Deserialize;

/// One layer of deployment settings.
///
/// Every field is optional so that partial layers (global defaults, a
/// request file, command-line flags) can be stacked with [`merge`].
/// Field names follow the Subversion deployment module conventions,
/// including its aliases (`name`/`repository` for `repo`, `version` for
/// `revision`).
///
/// [`merge`]: DeploySettings::merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploySettings {
    #[serde(alias = "name", alias = "repository")]
    pub repo: Option<String>,
    pub dest: Option<String>,
    #[serde(alias = "version")]
    pub revision: Option<Revision>,
    pub force: Option<bool>,
    pub export: Option<bool>,
    pub switch: Option<bool>,
    pub username: Option<String>,
    pub password: Option<Secret>,
    pub executable: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub trust_server_cert: Option<bool>,
}

impl DeploySettings {
    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(&mut self, other: DeploySettings) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        overlay!(
            repo,
            dest,
            revision,
            force,
            export,
            switch,
            username,
            password,
            executable,
            timeout_secs,
            trust_server_cert,
        );
    }

    /// Client invocation options described by these settings.
    pub fn client_options(&self) -> ClientOptions {
        let defaults = ClientOptions::default();
        ClientOptions {
            executable: self.executable.clone(),
            credentials: Credentials::new(self.username.clone(), self.password.clone()),
            trust_server_cert: self.trust_server_cert.unwrap_or(defaults.trust_server_cert),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}
