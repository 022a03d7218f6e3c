use infra_fs::NormalizedPath;
use infra_git::{Error, VersionControl, WorkingCopy};
use infra_test_utils::TestBranch;
use infra_test_utils::git::{commit_all, real_git_repo};
use pretty_assertions::assert_eq;

#[test]
fn test_new_rejects_non_repository() {
    let branch = TestBranch::new("master");
    let result = WorkingCopy::new(NormalizedPath::new(branch.root()), "master");
    assert!(matches!(result, Err(Error::NotARepository { .. })));
}

#[test]
fn test_checkout_returns_head_commit() {
    let branch = TestBranch::new("master");
    let repo = real_git_repo(&branch.branch_root());
    branch.write("boxes/codec.yml", "kind: Th2Box\n");
    let oid = commit_all(&repo, "add codec");

    let copy = WorkingCopy::new(NormalizedPath::new(branch.root()), "master").unwrap();
    assert_eq!(copy.checkout().unwrap(), oid.to_string());
}

#[test]
fn test_checkout_discards_uncommitted_changes() {
    let branch = TestBranch::new("master");
    let repo = real_git_repo(&branch.branch_root());
    branch.write("boxes/codec.yml", "kind: Th2Box\n");
    commit_all(&repo, "add codec");

    branch.write("boxes/codec.yml", "kind: Th2CoreBox\n");
    let copy = WorkingCopy::new(NormalizedPath::new(branch.root()), "master").unwrap();
    copy.checkout().unwrap();

    assert_eq!(branch.read("boxes/codec.yml"), "kind: Th2Box\n");
}

#[test]
fn test_branch_root_joins_branch_name() {
    let branch = TestBranch::new("dev");
    real_git_repo(&branch.branch_root());

    let root = NormalizedPath::new(branch.root());
    let copy = WorkingCopy::new(root.clone(), "dev").unwrap();

    assert_eq!(copy.current_branch().unwrap(), "dev");
    assert_eq!(copy.local_repository_root(), &root);
    assert_eq!(copy.branch_root().unwrap(), root.join("dev"));
}

#[test]
fn test_head_branch_reports_git_head() {
    let branch = TestBranch::new("master");
    let repo = real_git_repo(&branch.branch_root());
    branch.write("README.md", "# infra\n");
    commit_all(&repo, "initial");
    let head = repo.head().unwrap().shorthand().unwrap().to_string();

    let copy = WorkingCopy::new(NormalizedPath::new(branch.root()), "master").unwrap();
    assert_eq!(copy.head_branch().unwrap(), head);
}
