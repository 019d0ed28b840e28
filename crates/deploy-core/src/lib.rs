//! Reconciliation engine for svn-deploy
//!
//! Brings a local directory to a declared Subversion checkout or export,
//! doing nothing when it is already there. A run has three stages:
//!
//! - **Inspection**: [`StateInspector`] classifies what occupies the
//!   destination into a [`CurrentState`]
//! - **Planning**: [`select`] maps desired and current state to exactly one
//!   [`ReconciliationPlan`], without side effects
//! - **Execution**: [`Executor`] runs the plan's client operations and
//!   reports a [`ReconciliationResult`]
//!
//! [`Reconciler`] chains the three under a per-destination lock.
//!
//! # Architecture
//!
//! ```text
//!                 svn-deploy (CLI)
//!                        |
//!                   deploy-core
//!                        |
//!              +---------+---------+
//!              |                   |
//!          deploy-fs          deploy-svn
//! ```
//!
//! # Example
//!
//! ```ignore
//! use deploy_core::{DesiredState, Reconciler};
//! use deploy_svn::ClientOptions;
//!
//! let desired = DesiredState::new("svn+ssh://host/repo", "/srv/app")?;
//! let result = Reconciler::for_request(&desired, ClientOptions::default()).reconcile(&desired);
//! println!("changed: {}", result.changed);
//! ```

pub mod config;
pub mod desired;
pub mod error;
pub mod executor;
pub mod inspector;
pub mod plan;
pub mod reconciler;
pub mod result;
pub mod state;

pub use config::{ConfigResolver, DeploySettings, ResolvedRequest};
pub use desired::DesiredState;
pub use error::{Error, Result};
pub use executor::Executor;
pub use inspector::{InspectionError, StateInspector};
pub use plan::{FailureReason, ReconciliationPlan, select};
pub use reconciler::{Assessment, Reconciler};
pub use result::{ErrorKind, ReconcileError, ReconciliationResult};
pub use state::{CurrentState, WorkingCopy};
