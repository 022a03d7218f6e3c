//! Directory scanning and validation
//!
//! Every operation here takes the branch root (`<root>/<branch>`) and
//! re-reads from disk; nothing is cached between calls.
//!
//! A file that fails to parse or validate is logged and skipped. Only
//! failures of the scan itself (an unreadable directory) are returned.

use std::fmt;
use std::path::Path;

use infra_fs::{DocumentSuffix, NormalizedPath, checksum, io, path::strip_extension};

use crate::collision::{Admission, NameAccumulator};
use crate::kind::{self, KindDescriptor, ResourceKind};
use crate::{Error, Record, Result};

/// Names must be strictly shorter than this.
pub const RESOURCE_NAME_MAX_LENGTH: usize = 64;

/// Why a parsed document was not accepted for the kind being scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingMetadata,
    NameMismatch { name: String },
    NameTooLong { name: String },
    UnknownKind { kind: String },
    WrongDirectory { kind: String, dir: String },
    /// Belongs to another kind stored in the same directory. Not an
    /// error: that kind's own scan picks it up.
    OtherKind,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetadata | Self::NameMismatch { .. } => {
                f.write_str("resource name does not match filename")
            }
            Self::NameTooLong { name } => write!(
                f,
                "resource name \"{name}\" must be less than {RESOURCE_NAME_MAX_LENGTH} characters"
            ),
            Self::UnknownKind { kind } => write!(
                f,
                "unknown kind \"{kind}\". known values are: {:?}",
                kind::known_kind_names()
            ),
            Self::WrongDirectory { kind, dir } => write!(
                f,
                "resource is located in wrong directory. kind: {kind}, dir: {dir}"
            ),
            Self::OtherKind => f.write_str("resource belongs to another kind"),
        }
    }
}

/// Check a parsed record against the file it came from and the kind
/// being scanned.
pub fn validate(
    record: &Record,
    file_stem: &str,
    scanning: &KindDescriptor,
) -> std::result::Result<(), Rejection> {
    let Some(metadata) = record.metadata.as_ref() else {
        return Err(Rejection::MissingMetadata);
    };
    if metadata.name.is_empty() || metadata.name != file_stem {
        return Err(Rejection::NameMismatch {
            name: metadata.name.clone(),
        });
    }
    if metadata.name.chars().count() >= RESOURCE_NAME_MAX_LENGTH {
        return Err(Rejection::NameTooLong {
            name: metadata.name.clone(),
        });
    }

    let declared = kind::resolve(&record.kind).map_err(|_| Rejection::UnknownKind {
        kind: record.kind.clone(),
    })?;
    if declared.storage_path != scanning.storage_path {
        return Err(Rejection::WrongDirectory {
            kind: record.kind.clone(),
            dir: scanning.storage_path.unwrap_or_default().to_string(),
        });
    }
    if declared.kind != scanning.kind {
        return Err(Rejection::OtherKind);
    }
    Ok(())
}

/// Scan one kind's directory into `acc`.
///
/// A missing directory contributes nothing. A path that exists but is not
/// a directory is logged and contributes nothing.
pub fn scan_kind(root: &NormalizedPath, kind: ResourceKind, acc: &mut NameAccumulator) -> Result<()> {
    let descriptor = kind.descriptor();
    let Some(storage_path) = descriptor.storage_path else {
        return Ok(());
    };

    let dir = root.join(storage_path);
    if !dir.exists() {
        return Ok(());
    }
    if !dir.is_dir() {
        tracing::error!("entry expected to be a directory: \"{}\"", dir);
        return Ok(());
    }

    let files = io::list_dir(&dir)?;
    let mut accepted = 0usize;
    for file in files.iter().filter(|f| DocumentSuffix::is_document(f)) {
        let Some(record) = load_file(file) else {
            continue;
        };
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match validate(&record, strip_extension(&file_name), descriptor) {
            Ok(()) => {}
            Err(Rejection::OtherKind) => continue,
            Err(rejection) => {
                tracing::error!("skipping \"{}\" | {}", file.display(), rejection);
                continue;
            }
        }

        let record_kind = record.kind.clone();
        let name = record.name().unwrap_or_default().to_string();
        match acc.admit(record) {
            Admission::Accepted => accepted += 1,
            Admission::Collided { first_kind } => {
                tracing::error!(
                    "\"{record_kind}/{name}\" has the same name as \"{first_kind}/{name}\". \
                     skipping both of them. this may cause \"{name}\" to be undeployed"
                );
            }
        }
    }

    tracing::debug!(kind = %kind, dir = %dir, accepted, "scanned kind");
    Ok(())
}

// Read, parse and hash one document; failures are logged and yield None.
fn load_file(file: &Path) -> Option<Record> {
    let content = match io::read_bytes(&NormalizedPath::new(file)) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("skipping \"{}\" | exception loading resource: {}", file.display(), e);
            return None;
        }
    };
    match crate::codec::parse(&content) {
        Ok(mut record) => {
            record.set_source_hash(checksum::compute_content_checksum(&content));
            Some(record)
        }
        Err(e) => {
            tracing::error!("skipping \"{}\" | exception loading resource: {}", file.display(), e);
            None
        }
    }
}

/// Load every valid record of one kind.
pub fn load_kind(root: &NormalizedPath, kind: ResourceKind) -> Result<Vec<Record>> {
    load_kinds(root, [kind])
}

/// Load every kind in the registry under one shared collision map.
pub fn load_branch(root: &NormalizedPath) -> Result<Vec<Record>> {
    load_kinds(root, kind::all_kinds().iter().map(|d| d.kind))
}

/// Load every governed kind under one shared collision map.
pub fn load_governed(root: &NormalizedPath) -> Result<Vec<Record>> {
    load_kinds(root, kind::governed_kinds())
}

/// Load boxes, core boxes and both stores under one shared collision map.
pub fn load_boxes_and_stores(root: &NormalizedPath) -> Result<Vec<Record>> {
    load_kinds(root, ResourceKind::BOXES_AND_STORES)
}

/// Scan `kinds` in order under one shared collision map.
pub fn load_kinds(
    root: &NormalizedPath,
    kinds: impl IntoIterator<Item = ResourceKind>,
) -> Result<Vec<Record>> {
    let mut acc = NameAccumulator::new();
    for kind in kinds {
        scan_kind(root, kind, &mut acc)?;
    }
    Ok(acc.into_records())
}

/// Read a single resource by kind and name, trying `.yml` then `.yaml`.
///
/// Unlike a scan this does not validate the document against its file
/// name; a parse failure is returned as `Error::Parse`.
pub fn load_resource(root: &NormalizedPath, kind: ResourceKind, name: &str) -> Result<Record> {
    let storage_path = kind.storage_path().ok_or_else(|| Error::NotRepositoryResource {
        kind: kind.to_string(),
    })?;
    crate::mutator::check_name(name)?;
    let dir = root.join(storage_path);

    for suffix in DocumentSuffix::ALL {
        let path = dir.join(&format!("{name}{suffix}"));
        if !path.is_file() {
            continue;
        }
        let content = io::read_bytes(&path)?;
        let mut record = crate::codec::parse(&content).map_err(|e| Error::Parse {
            path: path.to_native(),
            message: e.to_string(),
        })?;
        record.set_source_hash(checksum::compute_content_checksum(&content));
        return Ok(record);
    }

    Err(Error::DoesNotExist {
        path: dir.join(&format!("{name}{}", DocumentSuffix::PRIMARY)).to_native(),
    })
}
