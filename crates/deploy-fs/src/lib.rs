//! Filesystem helpers for svn-deploy
//!
//! Provides normalized path handling, per-destination advisory locking and
//! format-agnostic loading of request/config files.

pub mod checksum;
pub mod config;
pub mod error;
pub mod lock;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use lock::DestinationLock;
pub use path::NormalizedPath;
