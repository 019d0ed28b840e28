//! Reconciliation outcome reporting

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plan::{FailureReason, ReconciliationPlan};

/// Classification of a failed reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    DestinationOccupied,
    LocalModifications,
    #[serde(rename = "URLMismatch")]
    UrlMismatch,
    InspectionError,
    ExecutionFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DestinationOccupied => "DestinationOccupied",
            Self::LocalModifications => "LocalModifications",
            Self::UrlMismatch => "URLMismatch",
            Self::InspectionError => "InspectionError",
            Self::ExecutionFailed => "ExecutionFailed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&FailureReason> for ErrorKind {
    fn from(reason: &FailureReason) -> Self {
        match reason {
            FailureReason::DestinationOccupied => Self::DestinationOccupied,
            FailureReason::LocalModifications => Self::LocalModifications,
            FailureReason::UrlMismatch { .. } => Self::UrlMismatch,
        }
    }
}

/// A classified failure with its message.
///
/// When the failure came from the svn client, `message` ends with the
/// client's stderr, unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ReconcileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an error whose message carries the client's stderr.
    pub fn with_stderr(kind: ErrorKind, summary: impl fmt::Display, stderr: &str) -> Self {
        let message = if stderr.trim().is_empty() {
            summary.to_string()
        } else {
            format!("{}\n{}", summary, stderr)
        };
        Self { kind, message }
    }
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ReconcileError {}

/// Outcome of one reconciliation.
///
/// `plan` is `None` only when the run failed before a plan was chosen.
/// `stdout` and `stderr` concatenate the output of every client invocation
/// made by the executor, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub changed: bool,
    pub final_revision: Option<u64>,
    pub plan: Option<ReconciliationPlan>,
    pub stdout: String,
    pub stderr: String,
    pub error: Option<ReconcileError>,
}

impl ReconciliationResult {
    /// Result for a run that stopped before reaching the executor.
    pub fn failed(plan: Option<ReconciliationPlan>, error: ReconcileError) -> Self {
        Self {
            changed: false,
            final_revision: None,
            plan,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Convert to a `Result`, keeping the full report on both sides.
    pub fn into_result(self) -> Result<Self, ReconcileError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_kind_serializes_with_wire_names() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::UrlMismatch).unwrap(),
            "\"URLMismatch\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorKind::ExecutionFailed).unwrap(),
            "\"ExecutionFailed\""
        );
    }

    #[test]
    fn message_carries_stderr_verbatim() {
        let stderr = "svn: E170013: Unable to connect to a repository at URL 'svn://x'\n";
        let error = ReconcileError::with_stderr(ErrorKind::ExecutionFailed, "update failed", stderr);
        assert!(error.message.ends_with(stderr));
        assert!(error.to_string().starts_with("ExecutionFailed: update failed"));
    }

    #[test]
    fn empty_stderr_is_not_appended() {
        let error = ReconcileError::with_stderr(ErrorKind::ExecutionFailed, "timed out", "  \n");
        assert_eq!(error.message, "timed out");
    }

    #[test]
    fn failed_result_is_unchanged() {
        let result = ReconciliationResult::failed(
            None,
            ReconcileError::new(ErrorKind::InspectionError, "permission denied"),
        );
        assert!(!result.changed);
        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(ErrorKind::InspectionError));
        assert!(result.into_result().is_err());
    }

    #[test]
    fn json_report_has_stable_fields() {
        let result = ReconciliationResult {
            changed: true,
            final_revision: Some(12),
            plan: Some(ReconciliationPlan::Update),
            stdout: "Updated to revision 12.\n".into(),
            stderr: String::new(),
            error: None,
        };
        let value: serde_json::Value = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(value["changed"], true);
        assert_eq!(value["final_revision"], 12);
        assert_eq!(value["plan"]["action"], "update");
        assert!(value["error"].is_null());
    }
}
