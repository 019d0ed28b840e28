//! Deployment request resolution with layered settings
//!
//! The `ConfigResolver` merges settings from several sources, later
//! sources overriding earlier ones, and validates the result into a
//! [`DesiredState`] plus the [`ClientOptions`] to run the client with.

use std::path::{Path, PathBuf};

use deploy_fs::{ConfigStore, NormalizedPath};
use deploy_svn::ClientOptions;

use super::DeploySettings;
use crate::{DesiredState, Result};

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "svn-deploy";

/// A validated request together with its client settings.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub desired: DesiredState,
    pub client: ClientOptions,
}

/// Resolves a deployment request by merging settings layers
///
/// Layers, in order:
/// 1. Global defaults (`<config_dir>/svn-deploy/config.toml`)
/// 2. Request file (TOML, JSON or YAML), when given
/// 3. Explicit overrides, typically command-line flags
///
/// A relative `dest` is resolved against the working directory, when one
/// is set.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    request_file: Option<PathBuf>,
    working_dir: Option<PathBuf>,

    /// Override for the global config directory (used for testing).
    /// When `None`, the platform-appropriate directory is used via `dirs::config_dir()`.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request_file = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Use a custom global config directory instead of the user's.
    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
    }

    /// Merge all layers without validating the result.
    pub fn merged(&self, overrides: DeploySettings) -> Result<DeploySettings> {
        let store = ConfigStore::new();
        let mut settings = DeploySettings::default();

        // Layer 1 - Global defaults
        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = global_dir.join("config.toml");
            if global_config_path.is_file() {
                tracing::debug!(?global_config_path, "Loading global config (layer 1)");
                settings.merge(store.load(&NormalizedPath::new(&global_config_path))?);
            } else {
                tracing::debug!(?global_config_path, "No global config found (layer 1), skipping");
            }
        }

        // Layer 2 - Request file; an explicit path must exist
        if let Some(request_file) = &self.request_file {
            tracing::debug!(?request_file, "Loading request file (layer 2)");
            settings.merge(store.load(&NormalizedPath::new(request_file))?);
        }

        // Layer 3 - Overrides
        settings.merge(overrides);

        if let (Some(dest), Some(working_dir)) = (&settings.dest, &self.working_dir) {
            settings.dest = Some(absolutize(dest, working_dir));
        }

        Ok(settings)
    }

    /// Merge all layers and validate the request.
    pub fn resolve(&self, overrides: DeploySettings) -> Result<ResolvedRequest> {
        let settings = self.merged(overrides)?;
        let client = settings.client_options();
        let desired = DesiredState::try_from(settings)?;

        tracing::debug!(repo = desired.repo_url(), dest = %desired.dest(), "Resolved deployment request");
        Ok(ResolvedRequest { desired, client })
    }
}

fn absolutize(dest: &str, working_dir: &Path) -> String {
    let path = NormalizedPath::new(dest);
    if dest.trim().is_empty() || path.is_absolute() {
        return dest.to_string();
    }
    NormalizedPath::new(working_dir.join(dest)).as_str().to_string()
}
