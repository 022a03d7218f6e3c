//! SHA-256 content digests
//!
//! Resource hashes are the bare lowercase hex encoding of the SHA-256
//! digest of the exact bytes stored on disk.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Compute the hex-encoded SHA-256 digest of raw bytes.
pub fn compute_content_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compute the hex-encoded SHA-256 digest of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_content_checksum(&content))
}
