//! Add, update and remove resource documents
//!
//! Paths are `<root>/<branch>/<storagePath>/<name><suffix>`. None of these
//! operations lock; the caller must hold exclusive access to the branch
//! root for the duration of the call.

use infra_fs::{DocumentSuffix, NormalizedPath, checksum, io};

use crate::kind::ResourceKind;
use crate::loader::RESOURCE_NAME_MAX_LENGTH;
use crate::{Error, Record, Result, codec};

/// Reject names that cannot be a single file stem inside a kind directory.
pub fn check_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains(['/', '\\'])
        || name.contains("..")
        || name.chars().count() >= RESOURCE_NAME_MAX_LENGTH
    {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Where `record` lives with the given suffix.
pub fn resource_path(
    root: &NormalizedPath,
    branch: &str,
    record: &Record,
    suffix: DocumentSuffix,
) -> Result<NormalizedPath> {
    let kind = record.resource_kind()?;
    let storage_path = kind.storage_path().ok_or_else(|| Error::NotRepositoryResource {
        kind: kind.to_string(),
    })?;
    let name = record.name().ok_or(Error::MissingMetadata)?;
    check_name(name)?;

    Ok(root
        .join(branch)
        .join(storage_path)
        .join(&format!("{name}{suffix}")))
}

/// Directory holding every document of `kind`.
pub fn kind_dir(root: &NormalizedPath, branch: &str, kind: ResourceKind) -> Result<NormalizedPath> {
    let storage_path = kind.storage_path().ok_or_else(|| Error::NotRepositoryResource {
        kind: kind.to_string(),
    })?;
    Ok(root.join(branch).join(storage_path))
}

// Serialize, stamp the hash of exactly those bytes, write.
fn save(path: &NormalizedPath, record: &mut Record) -> Result<()> {
    let content = codec::emit(record).map_err(|e| Error::Serialize {
        message: e.to_string(),
    })?;
    record.set_source_hash(checksum::compute_content_checksum(content.as_bytes()));
    io::write_atomic(path, content.as_bytes())?;
    Ok(())
}

/// Write a new resource with the primary suffix.
///
/// Fails with `AlreadyExists` if the primary-suffix file is present; the
/// secondary suffix is not checked.
pub fn add(root: &NormalizedPath, branch: &str, record: &mut Record) -> Result<()> {
    let path = resource_path(root, branch, record, DocumentSuffix::PRIMARY)?;
    if path.exists() {
        return Err(Error::AlreadyExists {
            path: path.to_native(),
        });
    }
    save(&path, record)?;
    tracing::info!(kind = %record.kind, path = %path, "added resource");
    Ok(())
}

/// Overwrite an existing resource in place, whichever suffix it has.
pub fn update(root: &NormalizedPath, branch: &str, record: &mut Record) -> Result<()> {
    for suffix in DocumentSuffix::ALL {
        let path = resource_path(root, branch, record, suffix)?;
        if path.is_file() {
            save(&path, record)?;
            tracing::info!(kind = %record.kind, path = %path, "updated resource");
            return Ok(());
        }
    }
    Err(Error::DoesNotExist {
        path: resource_path(root, branch, record, DocumentSuffix::PRIMARY)?.to_native(),
    })
}

/// Delete a resource's primary-suffix file.
pub fn remove(root: &NormalizedPath, branch: &str, record: &Record) -> Result<()> {
    let path = resource_path(root, branch, record, DocumentSuffix::PRIMARY)?;
    if !path.is_file() {
        return Err(Error::DoesNotExist {
            path: path.to_native(),
        });
    }
    io::remove_file(&path)?;
    tracing::info!(kind = %record.kind, path = %path, "removed resource");
    Ok(())
}

/// Delete every file of a retired kind, then its directory.
///
/// Refuses kinds stored at the branch root.
pub fn remove_all(root: &NormalizedPath, branch: &str, kind: ResourceKind) -> Result<()> {
    let dir = kind_dir(root, branch, kind)?;
    if kind.storage_path() == Some("") {
        return Err(Error::NotADirectory {
            path: dir.to_native(),
        });
    }
    if !dir.exists() {
        return Err(Error::DoesNotExist {
            path: dir.to_native(),
        });
    }
    if !dir.is_dir() {
        return Err(Error::NotADirectory {
            path: dir.to_native(),
        });
    }
    io::remove_dir_with_files(&dir)?;
    tracing::info!(kind = %kind, dir = %dir, "removed all resources of kind");
    Ok(())
}
