//! Error types for infra-git

use std::path::PathBuf;

/// Result type for infra-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in infra-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] infra_fs::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("HEAD is detached in {path}")]
    DetachedHead { path: PathBuf },
}
