//! Generic resource envelope
//!
//! Every document shares the same envelope:
//!
//! ```yaml
//! apiVersion: th2.exactpro.com/v1
//! kind: Th2Box
//! metadata:
//!   name: codec
//! spec:
//!   image-name: ghcr.io/th2-net/th2-codec
//! ```
//!
//! The `spec` payload stays an opaque YAML value until a consumer asks
//! for a typed view through [`Record::payload`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::kind::{self, ResourceKind};
use crate::settings::RepositorySettingsSpec;
use crate::{Error, Result};

/// Resource metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Unique within the kind's directory; must equal the file stem.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Metadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Where and when a loaded resource was observed.
///
/// Set by the caller after loading; the loader never derives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub commit_hash: String,
    pub detection_time: DateTime<Utc>,
}

/// A resource document.
///
/// `source_hash` and `provenance` are derived and never written back to
/// disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
    #[serde(skip)]
    source_hash: Option<String>,
    #[serde(skip)]
    provenance: Option<Provenance>,
}

/// Kind-specific view of a record's `spec`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<'a> {
    Settings(Box<RepositorySettingsSpec>),
    Opaque {
        kind: ResourceKind,
        spec: Option<&'a Value>,
    },
}

impl Record {
    /// Create a record of a known kind, taking `apiVersion` from the
    /// registry.
    pub fn new(kind: ResourceKind, name: impl Into<String>, spec: Option<Value>) -> Self {
        Self {
            api_version: kind.descriptor().schema_version.map(str::to_string),
            kind: kind.as_str().to_string(),
            metadata: Some(Metadata::named(name)),
            spec,
            source_hash: None,
            provenance: None,
        }
    }

    /// `metadata.name`, if metadata is present.
    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.name.as_str())
    }

    /// Resolve the declared kind against the registry.
    pub fn resource_kind(&self) -> Result<ResourceKind> {
        kind::resolve(&self.kind).map(|d| d.kind)
    }

    /// Group part of `apiVersion` (before the first `/`).
    ///
    /// Empty when there is no `/` or no `apiVersion`.
    pub fn api_group(&self) -> &str {
        self.api_version
            .as_deref()
            .and_then(|v| v.split_once('/'))
            .map(|(group, _)| group)
            .unwrap_or("")
    }

    /// Version part of `apiVersion` (after the first `/`).
    pub fn version(&self) -> &str {
        match self.api_version.as_deref() {
            Some(v) => v.split_once('/').map(|(_, version)| version).unwrap_or(v),
            None => "",
        }
    }

    /// Hex SHA-256 of the bytes this record was last read from or written to.
    pub fn source_hash(&self) -> Option<&str> {
        self.source_hash.as_deref()
    }

    pub fn set_source_hash(&mut self, hash: impl Into<String>) {
        self.source_hash = Some(hash.into());
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    pub fn stamp(&mut self, commit_hash: impl Into<String>, detection_time: DateTime<Utc>) {
        self.provenance = Some(Provenance {
            commit_hash: commit_hash.into(),
            detection_time,
        });
    }

    pub fn stamp_now(&mut self, commit_hash: impl Into<String>) {
        self.stamp(commit_hash, Utc::now());
    }

    /// Decode `spec` into the view for this record's kind.
    pub fn payload(&self) -> Result<Payload<'_>> {
        match self.resource_kind()? {
            ResourceKind::SettingsFile => {
                let spec = self.spec.clone().unwrap_or(Value::Null);
                Ok(Payload::Settings(Box::new(RepositorySettingsSpec::from_value(
                    spec,
                )?)))
            }
            kind => Ok(Payload::Opaque {
                kind,
                spec: self.spec.as_ref(),
            }),
        }
    }

    /// Decode `spec` into an arbitrary type.
    pub fn spec_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let spec = self.spec.clone().unwrap_or(Value::Null);
        serde_yaml::from_value(spec).map_err(|e| Error::Decode {
            kind: self.kind.clone(),
            message: e.to_string(),
        })
    }
}
