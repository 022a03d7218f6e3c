//! Static registry of resource kinds
//!
//! Every kind a document may declare is listed here together with the
//! directory it lives in and whether the reconciler governs it. The table
//! order is the scan order used by [`crate::loader::load_branch`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Known resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Repository-wide settings, stored at the branch root.
    SettingsFile,
    /// Managed outside the repository; never scanned.
    HelmRelease,
    /// Legacy link definitions, retired as a whole via
    /// [`crate::mutator::remove_all`].
    Th2Link,
    Th2Dictionary,
    Th2CoreBox,
    Th2Mstore,
    Th2Estore,
    Th2Box,
    Th2Job,
}

/// Registry entry for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    pub kind: ResourceKind,
    /// Sub-directory under the branch root. `Some("")` is the root
    /// itself; `None` marks a kind that has no documents in the repository.
    pub storage_path: Option<&'static str>,
    /// `apiVersion` written on new documents of this kind.
    pub schema_version: Option<&'static str>,
    /// Whether the reconciler tracks resources of this kind.
    pub governed: bool,
}

const TH2_API_VERSION: &str = "th2.exactpro.com/v1";

static DESCRIPTORS: [KindDescriptor; 9] = [
    KindDescriptor {
        kind: ResourceKind::SettingsFile,
        storage_path: Some(""),
        schema_version: None,
        governed: false,
    },
    KindDescriptor {
        kind: ResourceKind::HelmRelease,
        storage_path: None,
        schema_version: Some("helm.toolkit.fluxcd.io/v2beta1"),
        governed: false,
    },
    KindDescriptor {
        kind: ResourceKind::Th2Link,
        storage_path: Some("links"),
        schema_version: Some(TH2_API_VERSION),
        governed: false,
    },
    KindDescriptor {
        kind: ResourceKind::Th2Dictionary,
        storage_path: Some("dictionaries"),
        schema_version: Some(TH2_API_VERSION),
        governed: true,
    },
    KindDescriptor {
        kind: ResourceKind::Th2CoreBox,
        storage_path: Some("core"),
        schema_version: Some(TH2_API_VERSION),
        governed: true,
    },
    KindDescriptor {
        kind: ResourceKind::Th2Mstore,
        storage_path: Some("core"),
        schema_version: Some(TH2_API_VERSION),
        governed: true,
    },
    KindDescriptor {
        kind: ResourceKind::Th2Estore,
        storage_path: Some("core"),
        schema_version: Some(TH2_API_VERSION),
        governed: true,
    },
    KindDescriptor {
        kind: ResourceKind::Th2Box,
        storage_path: Some("boxes"),
        schema_version: Some(TH2_API_VERSION),
        governed: true,
    },
    KindDescriptor {
        kind: ResourceKind::Th2Job,
        storage_path: Some("jobs"),
        schema_version: Some(TH2_API_VERSION),
        governed: true,
    },
];

impl ResourceKind {
    /// Kinds whose union forms the "boxes and stores" view.
    pub const BOXES_AND_STORES: [Self; 4] = [
        Self::Th2Box,
        Self::Th2CoreBox,
        Self::Th2Estore,
        Self::Th2Mstore,
    ];

    /// The `kind` string used in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SettingsFile => "SettingsFile",
            Self::HelmRelease => "HelmRelease",
            Self::Th2Link => "Th2Link",
            Self::Th2Dictionary => "Th2Dictionary",
            Self::Th2CoreBox => "Th2CoreBox",
            Self::Th2Mstore => "Th2Mstore",
            Self::Th2Estore => "Th2Estore",
            Self::Th2Box => "Th2Box",
            Self::Th2Job => "Th2Job",
        }
    }

    pub fn descriptor(&self) -> &'static KindDescriptor {
        // DESCRIPTORS is declared in variant order
        &DESCRIPTORS[*self as usize]
    }

    pub fn storage_path(&self) -> Option<&'static str> {
        self.descriptor().storage_path
    }

    /// Whether documents of this kind live in the repository.
    pub fn is_repository_resource(&self) -> bool {
        self.storage_path().is_some()
    }

    pub fn is_governed(&self) -> bool {
        self.descriptor().governed
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        resolve(s).map(|d| d.kind)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up the descriptor for a `kind` string.
///
/// Matching is exact and case-sensitive.
pub fn resolve(kind: &str) -> crate::Result<&'static KindDescriptor> {
    DESCRIPTORS
        .iter()
        .find(|d| d.kind.as_str() == kind)
        .ok_or_else(|| Error::UnknownKind {
            kind: kind.to_string(),
        })
}

/// Every descriptor, in scan order.
pub fn all_kinds() -> &'static [KindDescriptor] {
    &DESCRIPTORS
}

/// Every known `kind` string.
pub fn known_kind_names() -> BTreeSet<&'static str> {
    DESCRIPTORS.iter().map(|d| d.kind.as_str()).collect()
}

/// Governed kinds, in scan order.
pub fn governed_kinds() -> impl Iterator<Item = ResourceKind> {
    DESCRIPTORS.iter().filter(|d| d.governed).map(|d| d.kind)
}
