//! Per-destination advisory locking
//!
//! A working copy has no locking of its own that covers a whole
//! checkout/update sequence, so concurrent deployments to the same path
//! must be serialized by the caller. [`DestinationLock`] does that with an
//! fs2 exclusive lock on a file named after the canonical destination.
//! Lock files never live inside the destination itself.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::checksum::destination_key;
use crate::{Error, NormalizedPath, Result};

/// Directory under the system temp dir holding lock files.
const LOCK_DIR_NAME: &str = "svn-deploy-locks";

/// Exclusive lock on a deployment destination.
///
/// Released when dropped.
#[derive(Debug)]
pub struct DestinationLock {
    file: File,
    lock_path: PathBuf,
}

impl DestinationLock {
    /// Default directory for lock files.
    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join(LOCK_DIR_NAME)
    }

    /// Block until the destination lock is held.
    pub fn acquire_in(lock_dir: &Path, destination: &NormalizedPath) -> Result<Self> {
        let (file, lock_path, destination) = open_lock_file(lock_dir, destination)?;

        tracing::debug!(dest = %destination, lock = ?lock_path, "Waiting for destination lock");
        file.lock_exclusive().map_err(|e| {
            tracing::warn!(dest = %destination, error = %e, "Destination lock failed");
            Error::LockFailed {
                path: lock_path.clone(),
            }
        })?;

        Ok(Self { file, lock_path })
    }

    /// Take the destination lock if nobody else holds it.
    ///
    /// Returns `Ok(None)` when the lock is contended.
    pub fn try_acquire_in(lock_dir: &Path, destination: &NormalizedPath) -> Result<Option<Self>> {
        let (file, lock_path, _) = open_lock_file(lock_dir, destination)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, lock_path })),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(_) => Err(Error::LockFailed { path: lock_path }),
        }
    }

    /// Path of the lock file backing this lock.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for DestinationLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(lock = ?self.lock_path, error = %e, "Failed to release destination lock");
        }
    }
}

fn open_lock_file(
    lock_dir: &Path,
    destination: &NormalizedPath,
) -> Result<(File, PathBuf, NormalizedPath)> {
    fs::create_dir_all(lock_dir).map_err(|e| Error::io(lock_dir, e))?;

    let canonical = canonical_destination(destination)?;
    let lock_path = lock_dir.join(format!("{}.lock", destination_key(&canonical)));

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;

    Ok((file, lock_path, canonical))
}

/// Canonicalize a destination that may not exist yet.
///
/// The deepest existing ancestor is resolved (symlinks included) and the
/// missing tail is appended lexically.
pub fn canonical_destination(destination: &NormalizedPath) -> Result<NormalizedPath> {
    let native = destination.to_native();
    let mut existing = native.as_path();
    let mut tail: Vec<&std::ffi::OsStr> = Vec::new();

    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name);
                existing = parent;
            }
            _ => return Ok(destination.clone()),
        }
    }

    let mut resolved = if existing.as_os_str().is_empty() {
        PathBuf::new()
    } else {
        dunce::canonicalize(existing).map_err(|e| Error::io(existing, e))?
    };
    for name in tail.into_iter().rev() {
        resolved.push(name);
    }

    Ok(NormalizedPath::new(resolved))
}
