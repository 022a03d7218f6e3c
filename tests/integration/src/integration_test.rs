//! End-to-end test of a branch under git
//!
//! Exercises the complete flow: commit resources -> snapshot -> mutate
//! under the branch lock -> commit -> snapshot again.

use infra_fs::NormalizedPath;
use infra_git::WorkingCopy;
use infra_repo::{Record, Repository, RepositoryMap, ResourceKind};
use infra_test_utils::git::{commit_all, real_git_repo};
use infra_test_utils::{TestBranch, resource_yaml};
use predicates::prelude::*;
use pretty_assertions::assert_eq;

const SETTINGS: &str = "\
k8s-propagation: rule
th2BoxConfig:
  logging:
    logLevelTh2: DEBUG";

/// A committed branch with settings, a retired link and a few boxes.
fn setup_branch() -> (TestBranch, git2::Repository) {
    let branch = TestBranch::new("master");
    branch.write(
        "infra-mgr-config.yml",
        &resource_yaml("SettingsFile", "infra-mgr-config", SETTINGS),
    );
    branch.write("links/legacy.yml", &resource_yaml("Th2Link", "legacy", ""));
    branch.write("boxes/codec.yml", &resource_yaml("Th2Box", "codec", "image-name: codec:1"));
    branch.write("boxes/act.yaml", &resource_yaml("Th2Box", "act", "image-name: act:1"));
    branch.write("core/mstore.yml", &resource_yaml("Th2Mstore", "mstore", ""));
    branch.write("core/estore.yml", &resource_yaml("Th2Estore", "estore", ""));
    branch.write("dictionaries/fix.yml", &resource_yaml("Th2Dictionary", "fix", "data: abc"));

    let git = real_git_repo(&branch.branch_root());
    commit_all(&git, "initial resources");
    (branch, git)
}

fn open(branch: &TestBranch) -> Repository<WorkingCopy> {
    let copy = WorkingCopy::new(NormalizedPath::new(branch.root()), branch.name()).unwrap();
    Repository::new(copy)
}

#[test]
fn test_snapshot_then_mutate_then_snapshot() {
    let (branch, git) = setup_branch();
    let repo = open(&branch);

    let first = repo.snapshot().unwrap();
    let settings = first.settings().unwrap();
    assert!(settings.is_k8s_governance_required());
    assert_eq!(settings.log_level_th2().as_str(), "DEBUG");
    assert_eq!(first.resources().len(), 7);

    let map = RepositoryMap::from_records(first.resources());
    assert_eq!(map.len(), 5);
    let codec_hash = map
        .get(ResourceKind::Th2Box, "codec")
        .and_then(Record::source_hash)
        .map(str::to_string);

    {
        let _lock = repo.lock().unwrap();

        let mut job = Record::new(ResourceKind::Th2Job, "cleanup", None);
        repo.add(&mut job).unwrap();

        let mut codec = repo.resource(ResourceKind::Th2Box, "codec").unwrap();
        codec.spec = Some(serde_yaml::from_str("image-name: codec:2").unwrap());
        repo.update(&mut codec).unwrap();

        let act = repo.resource(ResourceKind::Th2Box, "act").unwrap();
        // remove only looks at the primary suffix
        assert!(repo.remove(&act).is_err());

        repo.remove_link_resources().unwrap();
    }
    let second_oid = commit_all(&git, "retire links, add cleanup job");
    let committed = git.find_commit(second_oid).unwrap().tree().unwrap();
    assert!(
        committed
            .iter()
            .all(|entry| !entry.name().unwrap_or_default().ends_with(".lock"))
    );

    let second = repo.snapshot().unwrap();
    assert_eq!(second.commit_ref(), second_oid.to_string());

    let map = RepositoryMap::from_records(second.resources());
    assert!(map.get(ResourceKind::Th2Job, "cleanup").is_some());
    assert!(map.get(ResourceKind::Th2Box, "act").is_some());
    let new_codec_hash = map
        .get(ResourceKind::Th2Box, "codec")
        .and_then(Record::source_hash)
        .map(str::to_string);
    assert_ne!(new_codec_hash, codec_hash);
    assert!(
        second
            .resources()
            .iter()
            .all(|r| r.kind != ResourceKind::Th2Link.as_str())
    );

    let links = predicate::path::missing();
    assert!(links.eval(&branch.branch_root().join("links")));
}

#[test]
fn test_collision_introduced_by_commit_drops_both() {
    let (branch, git) = setup_branch();
    let repo = open(&branch);
    assert!(
        RepositoryMap::from_records(repo.snapshot().unwrap().resources())
            .get(ResourceKind::Th2Dictionary, "fix")
            .is_some()
    );

    branch.write("boxes/fix.yml", &resource_yaml("Th2Box", "fix", "image-name: fix:1"));
    commit_all(&git, "add colliding box");

    let snapshot = repo.snapshot().unwrap();
    let map = RepositoryMap::from_records(snapshot.resources());
    assert!(map.get(ResourceKind::Th2Dictionary, "fix").is_none());
    assert!(map.get(ResourceKind::Th2Box, "fix").is_none());
    assert!(map.get(ResourceKind::Th2Box, "codec").is_some());
}

#[test]
fn test_snapshot_is_stable_without_changes() {
    let (branch, _git) = setup_branch();
    let repo = open(&branch);

    let first = repo.snapshot().unwrap();
    let second = repo.snapshot().unwrap();

    assert_eq!(first.commit_ref(), second.commit_ref());
    assert_eq!(first.resources(), second.resources());
}

#[test]
fn test_forced_checkout_keeps_untracked_and_resets_tracked() {
    let (branch, _git) = setup_branch();
    let repo = open(&branch);

    // untracked files survive a forced checkout
    branch.write("jobs/adhoc.yml", &resource_yaml("Th2Job", "adhoc", ""));
    let snapshot = repo.snapshot().unwrap();
    assert!(
        snapshot
            .resources()
            .iter()
            .any(|r| r.name() == Some("adhoc"))
    );

    // tracked edits do not
    branch.write("boxes/codec.yml", &resource_yaml("Th2Box", "codec", "image-name: dirty"));
    let snapshot = repo.snapshot().unwrap();
    let codec = snapshot
        .resources()
        .iter()
        .find(|r| r.name() == Some("codec"))
        .unwrap();
    assert_eq!(
        codec.spec.as_ref().unwrap()["image-name"],
        serde_yaml::Value::from("codec:1")
    );
}
