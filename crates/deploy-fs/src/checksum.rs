//! SHA-256 keys for destination paths
//!
//! Lock files are named after the digest of the canonical destination so
//! that any spelling of the same directory maps to the same lock.

use sha2::{Digest, Sha256};

use crate::NormalizedPath;

/// Compute the lock key for a normalized destination path.
///
/// Returns the lowercase hex SHA-256 of the path string.
pub fn destination_key(path: &NormalizedPath) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}
