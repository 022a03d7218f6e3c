//! Git repository fixtures.
//!
//! Everything goes through `git2` so tests do not depend on a `git`
//! binary being installed.

use std::path::Path;

use git2::{IndexAddOption, Oid, Repository, Signature};

/// Initialises a real git repository with no history.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> Repository {
    Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Stages every file in the working tree, including deletions, and
/// commits it on top of HEAD.
///
/// Creates the root commit when the repository has no history yet.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().expect("commit_all: index");
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .expect("commit_all: add_all");
    index
        .update_all(["*"], None)
        .expect("commit_all: update_all");
    index.write().expect("commit_all: write index");
    let tree_id = index.write_tree().expect("commit_all: write_tree");
    let tree = repo.find_tree(tree_id).expect("commit_all: find_tree");
    let sig = Signature::now("Test User", "test@test.com").expect("commit_all: signature");

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("commit_all: commit")
}
