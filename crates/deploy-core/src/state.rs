//! Observed state of a destination

use std::fmt;

use serde::Serialize;

/// Working copy metadata read through `svn info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingCopy {
    pub url: String,
    pub repository_root: Option<String>,
    pub revision: u64,
}

/// What currently occupies the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CurrentState {
    /// Nothing there, or an empty directory
    Absent,
    /// A working copy without local modifications
    CheckedOutClean(WorkingCopy),
    /// A working copy with local modifications to versioned files
    CheckedOutDirty(WorkingCopy),
    /// Unversioned content where an export was requested
    ExportedOnly,
    /// Content that is neither a working copy nor a requested export
    ForeignContent,
}

impl CurrentState {
    pub fn working_copy(&self) -> Option<&WorkingCopy> {
        match self {
            Self::CheckedOutClean(wc) | Self::CheckedOutDirty(wc) => Some(wc),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::CheckedOutClean(_) => "checked-out-clean",
            Self::CheckedOutDirty(_) => "checked-out-dirty",
            Self::ExportedOnly => "exported-only",
            Self::ForeignContent => "foreign-content",
        }
    }
}

impl fmt::Display for CurrentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.working_copy() {
            Some(wc) => write!(f, "{} ({} @ r{})", self.label(), wc.url, wc.revision),
            None => f.write_str(self.label()),
        }
    }
}
