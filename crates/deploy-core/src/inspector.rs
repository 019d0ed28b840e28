//! Classification of what occupies a destination

use std::fs;
use std::io;

use deploy_fs::NormalizedPath;
use deploy_svn::{METADATA_DIR, SvnClient};

use crate::desired::DesiredState;
use crate::state::{CurrentState, WorkingCopy};

/// The destination could not be examined.
#[derive(Debug, thiserror::Error)]
pub enum InspectionError {
    #[error("Cannot read destination {path}: {source}")]
    Unreadable {
        path: NormalizedPath,
        #[source]
        source: io::Error,
    },

    #[error("Cannot query working copy at {path}: {source}")]
    Client {
        path: NormalizedPath,
        #[source]
        source: deploy_svn::Error,
    },
}

impl InspectionError {
    /// Stderr of the failed client invocation, when there was one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Client {
                source: deploy_svn::Error::CommandFailed { stderr, .. },
                ..
            } => Some(stderr),
            _ => None,
        }
    }
}

/// Reads the destination and classifies it into a [`CurrentState`].
///
/// Never modifies the destination.
pub struct StateInspector<'a> {
    client: &'a dyn SvnClient,
}

impl<'a> StateInspector<'a> {
    pub fn new(client: &'a dyn SvnClient) -> Self {
        Self { client }
    }

    pub fn inspect(&self, desired: &DesiredState) -> Result<CurrentState, InspectionError> {
        let dest = desired.dest();
        let native = dest.to_native();
        let unreadable = |source: io::Error| InspectionError::Unreadable {
            path: dest.clone(),
            source,
        };

        let metadata = match fs::metadata(&native) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dest = %dest, "Destination does not exist");
                return Ok(CurrentState::Absent);
            }
            Err(e) => return Err(unreadable(e)),
        };

        if !metadata.is_dir() {
            tracing::debug!(dest = %dest, "Destination is not a directory");
            return Ok(CurrentState::ForeignContent);
        }

        match fs::read_dir(&native).map_err(unreadable)?.next() {
            None => {
                tracing::debug!(dest = %dest, "Destination is an empty directory");
                return Ok(CurrentState::Absent);
            }
            Some(Err(e)) => return Err(unreadable(e)),
            Some(Ok(_)) => {}
        }

        if !native.join(METADATA_DIR).is_dir() {
            let state = if desired.export_only() {
                CurrentState::ExportedOnly
            } else {
                CurrentState::ForeignContent
            };
            tracing::debug!(dest = %dest, state = state.label(), "Destination has no working copy metadata");
            return Ok(state);
        }

        let client_error = |source: deploy_svn::Error| InspectionError::Client {
            path: dest.clone(),
            source,
        };
        let info = self
            .client
            .info(dest.as_str(), None)
            .map_err(client_error)?;
        let status = self.client.status(dest).map_err(client_error)?;

        let working_copy = WorkingCopy {
            url: info.url,
            repository_root: info.repository_root,
            revision: info.revision,
        };

        let state = if status.is_dirty() {
            tracing::debug!(
                dest = %dest,
                modified = status.modified.len(),
                "Working copy has local modifications"
            );
            CurrentState::CheckedOutDirty(working_copy)
        } else {
            CurrentState::CheckedOutClean(working_copy)
        };

        Ok(state)
    }
}
