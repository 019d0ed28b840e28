//! Shared test utilities for the svn-deploy workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`]: destination fixtures at three realism levels
//! - [`svn`]: [`SimulatedSvn`], an in-process Subversion double

pub mod fixtures;
pub mod svn;

pub use fixtures::TestDestination;
pub use svn::{Invocation, Operation, SimulatedSvn};
