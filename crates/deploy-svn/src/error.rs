//! Error types for deploy-svn

use std::path::PathBuf;
use std::time::Duration;

/// Result type for deploy-svn operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the svn client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("svn executable '{name}' not found in PATH")]
    ExecutableNotFound { name: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("`{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Could not parse svn {what} output: {message}")]
    Parse { what: String, message: String },

    #[error("Invalid revision: '{value}'")]
    InvalidRevision { value: String },
}
