//! Error types for infra-repo
//!
//! Only operation-level failures live here. A bad file found while
//! scanning a directory is logged and skipped, never returned.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] infra_fs::Error),

    #[error("Version control error: {0}")]
    Git(#[from] infra_git::Error),

    #[error("Resource already exists at {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Resource does not exist at {path}")]
    DoesNotExist { path: PathBuf },

    #[error("Entry expected to be a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to decode {kind} payload: {message}")]
    Decode { kind: String, message: String },

    #[error("Failed to serialize resource: {message}")]
    Serialize { message: String },

    #[error("Unknown kind \"{kind}\"")]
    UnknownKind { kind: String },

    #[error("Kind {kind} is not stored in the repository")]
    NotRepositoryResource { kind: String },

    #[error("Invalid resource name \"{name}\"")]
    InvalidName { name: String },

    #[error("Resource has no metadata")]
    MissingMetadata,

    #[error("Settings file not found under {path}")]
    SettingsNotFound { path: PathBuf },

    #[error("Unknown value ({value})")]
    InvalidLogLevel { value: String },
}
