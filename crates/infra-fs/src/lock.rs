//! Advisory lock over a branch working tree

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};

use crate::{Error, NormalizedPath, Result};

/// Suffix of the lock file kept next to each branch root.
pub const LOCK_FILE_SUFFIX: &str = ".infra-repo.lock";

/// `<parent>/.<branch><LOCK_FILE_SUFFIX>` for a branch root
/// `<parent>/<branch>`.
///
/// The lock lives outside the working tree so it is never picked up by a
/// commit. A root without a parent keeps the lock inside itself.
pub fn lock_path(root: &NormalizedPath) -> NormalizedPath {
    match (root.parent(), root.file_name()) {
        (Some(parent), Some(name)) => parent.join(&format!(".{name}{LOCK_FILE_SUFFIX}")),
        _ => root.join(LOCK_FILE_SUFFIX),
    }
}

/// Exclusive advisory lock on one branch root.
///
/// Loader and mutator operations never lock by themselves; holding a
/// `BranchLock` for the duration of a call is how callers serialize access
/// to a root. The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct BranchLock {
    file: File,
    path: NormalizedPath,
}

impl BranchLock {
    /// Acquire the lock, blocking until it is available.
    pub fn acquire(root: &NormalizedPath) -> Result<Self> {
        let (file, path) = Self::open(root)?;
        file.lock_exclusive().map_err(|_| Error::LockFailed {
            path: path.to_native(),
        })?;
        tracing::debug!(root = %root, "branch lock acquired");
        Ok(Self { file, path })
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `Ok(None)` if another holder owns it.
    pub fn try_acquire(root: &NormalizedPath) -> Result<Option<Self>> {
        let (file, path) = Self::open(root)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(_) => Err(Error::LockFailed {
                path: path.to_native(),
            }),
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn open(root: &NormalizedPath) -> Result<(File, NormalizedPath)> {
        let native_root = root.to_native();
        fs::create_dir_all(&native_root).map_err(|e| Error::io(&native_root, e))?;
        let path = lock_path(root);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.to_native())
            .map_err(|e| Error::io(path.to_native(), e))?;
        Ok((file, path))
    }
}

impl Drop for BranchLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path, error = %e, "failed to release branch lock");
        }
    }
}
