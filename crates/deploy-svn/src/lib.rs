//! Subversion client abstraction for svn-deploy
//!
//! The engine talks to Subversion only through the [`SvnClient`] trait.
//! [`SvnCli`] implements it on top of the `svn` command-line client; its
//! stdout, stderr and exit code are the only channel of truth.

pub mod client;
pub mod command;
pub mod error;
pub mod info;
pub mod revision;
pub mod secret;
pub mod status;

pub use client::{ClientOptions, Credentials, SvnCli, SvnClient};
pub use command::{CommandOutput, SvnCommand};
pub use error::{Error, Result};
pub use info::SvnInfo;
pub use revision::Revision;
pub use secret::Secret;
pub use status::LocalStatus;

/// Name of the administrative directory at the root of a working copy.
pub const METADATA_DIR: &str = ".svn";
