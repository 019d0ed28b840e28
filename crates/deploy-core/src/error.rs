//! Error types for deploy-core

/// Result type for deploy-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised before a reconciliation starts
///
/// Failures that happen while reconciling are not errors of this type; they
/// are reported through [`crate::ReconciliationResult`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request violates a [`crate::DesiredState`] invariant
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from deploy-fs
    #[error(transparent)]
    Fs(#[from] deploy_fs::Error),

    /// Client error from deploy-svn
    #[error(transparent)]
    Svn(#[from] deploy_svn::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}
