//! git2-backed working copy of a single branch

use git2::{Repository, build::CheckoutBuilder};
use infra_fs::NormalizedPath;

use crate::{Error, Result, provider::VersionControl};

/// A branch checked out at `<root>/<branch>`.
///
/// `checkout` force-resets the working tree to the branch HEAD and
/// reports the HEAD commit id. Fetching from remotes is left to whoever
/// maintains the clone.
pub struct WorkingCopy {
    root: NormalizedPath,
    branch: String,
}

impl WorkingCopy {
    /// Create a WorkingCopy for `branch` under `root`.
    ///
    /// Fails if `<root>/<branch>` is not a git working tree.
    pub fn new(root: NormalizedPath, branch: impl Into<String>) -> Result<Self> {
        let branch = branch.into();
        let tree = root.join(&branch);
        if !tree.join(".git").exists() {
            return Err(Error::NotARepository {
                path: tree.to_native(),
            });
        }
        Ok(Self { root, branch })
    }

    /// Branch HEAD currently points at, as recorded by git.
    pub fn head_branch(&self) -> Result<String> {
        let repo = self.open()?;
        let head = repo.head()?;
        if !head.is_branch() {
            return Err(Error::DetachedHead {
                path: self.tree().to_native(),
            });
        }
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    fn tree(&self) -> NormalizedPath {
        self.root.join(&self.branch)
    }

    fn open(&self) -> Result<Repository> {
        Ok(Repository::open(self.tree().to_native())?)
    }
}

impl VersionControl for WorkingCopy {
    fn checkout(&self) -> Result<String> {
        let repo = self.open()?;
        let mut opts = CheckoutBuilder::new();
        opts.force();
        repo.checkout_head(Some(&mut opts))?;

        let commit = repo.head()?.peel_to_commit()?;
        let commit_ref = commit.id().to_string();
        tracing::debug!(branch = %self.branch, commit = %commit_ref, "checked out");
        Ok(commit_ref)
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn local_repository_root(&self) -> &NormalizedPath {
        &self.root
    }
}
