//! Plan selection
//!
//! [`select`] maps a desired state and an observed state to exactly one
//! [`ReconciliationPlan`]. It is pure: no I/O and no client calls. The rules
//! are checked in this order:
//!
//! | current state         | condition                        | plan                                  |
//! |-----------------------|----------------------------------|---------------------------------------|
//! | foreign content       | no force                         | fail: destination occupied            |
//! | foreign content       | force                            | checkout/export with `--force`        |
//! | absent                | export requested                 | export                                |
//! | absent                |                                  | checkout                              |
//! | exported only         | force                            | export with `--force`                 |
//! | exported only         | no force                         | no-op                                 |
//! | dirty working copy    | no force                         | fail: local modifications             |
//! | dirty working copy    | force                            | revert, then switch or update         |
//! | clean working copy    | URL differs, switching enabled   | switch, then update                   |
//! | clean working copy    | URL differs, switching disabled  | fail: URL mismatch                    |
//! | clean working copy    | revision already current         | no-op                                 |
//! | clean working copy    | otherwise                        | update                                |
//!
//! Local modifications take precedence over a URL change: a forced run
//! against a dirty working copy on another URL reverts before switching.

use std::fmt;

use serde::Serialize;

use crate::desired::{DesiredState, urls_match};
use crate::state::CurrentState;

/// Why a plan refuses to touch the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    DestinationOccupied,
    LocalModifications,
    UrlMismatch { current: String, desired: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DestinationOccupied => {
                f.write_str("destination exists and is not a working copy; use force to overwrite")
            }
            Self::LocalModifications => {
                f.write_str("working copy has local modifications; use force to discard them")
            }
            Self::UrlMismatch { current, desired } => write!(
                f,
                "working copy tracks '{}' but '{}' was requested and switching is disabled",
                current, desired
            ),
        }
    }
}

/// The single action chosen to move a destination toward its desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconciliationPlan {
    NoOp,
    Checkout { force: bool },
    Export { force: bool },
    /// Switch to the requested URL, then update
    Switch,
    Update,
    /// Revert local modifications, then switch (if `switch`) or update
    ForceDiscardAndUpdate { switch: bool },
    Fail { reason: FailureReason },
}

impl ReconciliationPlan {
    /// Whether executing this plan runs client operations.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::NoOp | Self::Fail { .. })
    }

    /// Whether the plan leaves a working copy behind.
    pub fn targets_working_copy(&self) -> bool {
        matches!(
            self,
            Self::Checkout { .. } | Self::Switch | Self::Update | Self::ForceDiscardAndUpdate { .. }
        )
    }

    fn fail(reason: FailureReason) -> Self {
        Self::Fail { reason }
    }
}

impl fmt::Display for ReconciliationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => f.write_str("no-op"),
            Self::Checkout { force: false } => f.write_str("checkout"),
            Self::Checkout { force: true } => f.write_str("checkout --force"),
            Self::Export { force: false } => f.write_str("export"),
            Self::Export { force: true } => f.write_str("export --force"),
            Self::Switch => f.write_str("switch + update"),
            Self::Update => f.write_str("update"),
            Self::ForceDiscardAndUpdate { switch: true } => f.write_str("revert + switch + update"),
            Self::ForceDiscardAndUpdate { switch: false } => f.write_str("revert + update"),
            Self::Fail { reason } => write!(f, "fail ({})", reason),
        }
    }
}

/// Choose the plan for `desired` given what the destination holds.
///
/// A symbolic revision on a clean working copy always selects
/// [`ReconciliationPlan::Update`]; pin it to a number first to get a no-op
/// when the working copy is already there.
pub fn select(desired: &DesiredState, current: &CurrentState) -> ReconciliationPlan {
    use ReconciliationPlan as Plan;

    match current {
        CurrentState::ForeignContent if !desired.force() => {
            Plan::fail(FailureReason::DestinationOccupied)
        }
        CurrentState::ForeignContent if desired.export_only() => Plan::Export { force: true },
        CurrentState::ForeignContent => Plan::Checkout { force: true },

        CurrentState::Absent if desired.export_only() => Plan::Export { force: false },
        CurrentState::Absent => Plan::Checkout { force: false },

        CurrentState::ExportedOnly if desired.force() => Plan::Export { force: true },
        CurrentState::ExportedOnly => Plan::NoOp,

        CurrentState::CheckedOutDirty(_) if !desired.force() => {
            Plan::fail(FailureReason::LocalModifications)
        }
        CurrentState::CheckedOutDirty(wc) => Plan::ForceDiscardAndUpdate {
            switch: desired.switch() && !urls_match(&wc.url, desired.repo_url()),
        },

        CurrentState::CheckedOutClean(wc) if !urls_match(&wc.url, desired.repo_url()) => {
            if desired.switch() {
                Plan::Switch
            } else {
                Plan::fail(FailureReason::UrlMismatch {
                    current: wc.url.clone(),
                    desired: desired.repo_url().to_string(),
                })
            }
        }
        CurrentState::CheckedOutClean(wc) if desired.revision().number() == Some(wc.revision) => {
            Plan::NoOp
        }
        CurrentState::CheckedOutClean(_) => Plan::Update,
    }
}
