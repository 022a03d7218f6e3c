//! Filesystem layer for the infra repository
//!
//! Provides normalized path handling, document suffix rules, content
//! hashing, atomic writes and the advisory branch lock.

pub mod checksum;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;
pub mod suffix;

pub use error::{Error, Result};
pub use lock::BranchLock;
pub use path::NormalizedPath;
pub use suffix::DocumentSuffix;
