//! Error types for deploy-cli

use deploy_core::ReconcileError;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from deploy-core, raised while building the request
    #[error(transparent)]
    Core(#[from] deploy_core::Error),

    /// The reconciliation ran and failed
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
