//! Branch snapshots and per-kind grouping

use std::collections::BTreeMap;

use infra_fs::NormalizedPath;

use crate::kind::{self, ResourceKind};
use crate::settings::RepositorySettingsSpec;
use crate::{Record, Result, loader};

/// Every resource of a branch at one commit, plus decoded settings.
///
/// Absent settings mean "use defaults".
#[derive(Debug, Clone)]
pub struct RepositorySnapshot {
    commit_ref: String,
    resources: Vec<Record>,
    settings: Option<RepositorySettingsSpec>,
}

impl RepositorySnapshot {
    /// Pair loaded resources with a commit and decode the settings record
    /// among them, if any.
    ///
    /// An invalid settings payload (such as an unknown log level) is an
    /// error.
    pub fn new(commit_ref: impl Into<String>, resources: Vec<Record>) -> Result<Self> {
        let settings = match find_settings(&resources) {
            Some(record) => {
                let spec = record.spec.clone().unwrap_or(serde_yaml::Value::Null);
                Some(RepositorySettingsSpec::from_value(spec)?)
            }
            None => None,
        };
        Ok(Self {
            commit_ref: commit_ref.into(),
            resources,
            settings,
        })
    }

    pub fn commit_ref(&self) -> &str {
        &self.commit_ref
    }

    pub fn resources(&self) -> &[Record] {
        &self.resources
    }

    pub fn settings(&self) -> Option<&RepositorySettingsSpec> {
        self.settings.as_ref()
    }

    pub fn into_resources(self) -> Vec<Record> {
        self.resources
    }
}

/// Load a whole branch and wrap it with `commit_ref`.
pub fn build_snapshot(root: &NormalizedPath, commit_ref: &str) -> Result<RepositorySnapshot> {
    let resources = loader::load_branch(root)?;
    tracing::debug!(commit = commit_ref, count = resources.len(), "built snapshot");
    RepositorySnapshot::new(commit_ref, resources)
}

/// The settings record among `records`.
///
/// A branch holds at most one in practice; if several slip through, the
/// first wins and the rest are reported.
pub fn find_settings(records: &[Record]) -> Option<&Record> {
    let mut found = records
        .iter()
        .filter(|r| r.kind == ResourceKind::SettingsFile.as_str());
    let first = found.next()?;
    for extra in found {
        tracing::warn!(
            name = extra.name().unwrap_or_default(),
            "ignoring additional settings record"
        );
    }
    Some(first)
}

/// Governed resources grouped as `kind -> name -> record`.
///
/// Every governed kind has an entry, empty or not.
#[derive(Debug, Clone, Default)]
pub struct RepositoryMap {
    by_kind: BTreeMap<ResourceKind, BTreeMap<String, Record>>,
}

impl RepositoryMap {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut by_kind: BTreeMap<_, BTreeMap<String, Record>> =
            kind::governed_kinds().map(|k| (k, BTreeMap::new())).collect();

        for record in records {
            let Ok(kind) = record.resource_kind() else {
                continue;
            };
            if let Some(named) = by_kind.get_mut(&kind) {
                named.insert(record.name().unwrap_or_default().to_string(), record.clone());
            }
        }
        Self { by_kind }
    }

    pub fn kind(&self, kind: ResourceKind) -> Option<&BTreeMap<String, Record>> {
        self.by_kind.get(&kind)
    }

    pub fn get(&self, kind: ResourceKind, name: &str) -> Option<&Record> {
        self.by_kind.get(&kind)?.get(name)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.by_kind.keys().copied()
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.by_kind.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_without_settings() {
        let records = vec![Record::new(ResourceKind::Th2Box, "codec", None)];
        let snapshot = RepositorySnapshot::new("abc", records).unwrap();
        assert_eq!(snapshot.commit_ref(), "abc");
        assert_eq!(snapshot.resources().len(), 1);
        assert!(snapshot.settings().is_none());
    }

    #[test]
    fn test_snapshot_decodes_settings() {
        let spec = serde_yaml::from_str("k8s-propagation: deny").unwrap();
        let records = vec![
            Record::new(ResourceKind::SettingsFile, "infra-mgr-config", Some(spec)),
            Record::new(ResourceKind::Th2Box, "codec", None),
        ];
        let snapshot = RepositorySnapshot::new("abc", records).unwrap();
        assert!(snapshot.settings().unwrap().is_k8s_propagation_denied());
    }

    #[test]
    fn test_snapshot_rejects_bad_log_level() {
        let spec = serde_yaml::from_str("th2BoxConfig:\n  logging:\n    logLevelRoot: LOUD\n").unwrap();
        let records = vec![Record::new(
            ResourceKind::SettingsFile,
            "infra-mgr-config",
            Some(spec),
        )];
        assert!(RepositorySnapshot::new("abc", records).is_err());
    }

    #[test]
    fn test_repository_map_groups_governed_kinds() {
        let records = vec![
            Record::new(ResourceKind::Th2Box, "codec", None),
            Record::new(ResourceKind::Th2Mstore, "mstore", None),
            Record::new(ResourceKind::SettingsFile, "infra-mgr-config", None),
            Record::new(ResourceKind::Th2Link, "links", None),
        ];
        let map = RepositoryMap::from_records(&records);

        assert_eq!(map.kinds().count(), 6);
        assert_eq!(map.len(), 2);
        assert!(map.get(ResourceKind::Th2Box, "codec").is_some());
        assert!(map.kind(ResourceKind::Th2Job).unwrap().is_empty());
        assert!(map.kind(ResourceKind::SettingsFile).is_none());
    }

    #[test]
    fn test_find_settings() {
        let records = vec![
            Record::new(ResourceKind::Th2Box, "codec", None),
            Record::new(ResourceKind::SettingsFile, "infra-mgr-config", None),
        ];
        assert_eq!(
            find_settings(&records).and_then(Record::name),
            Some("infra-mgr-config")
        );
        assert!(find_settings(&records[..1]).is_none());
    }
}
