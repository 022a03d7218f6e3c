//! Repository facade over a version-control collaborator
//!
//! Resolves `<local root>/<branch>` from the collaborator and forwards to
//! [`crate::loader`], [`crate::mutator`], [`crate::snapshot`] and
//! [`crate::settings`]. Nothing here locks: wrap each call in
//! [`Repository::lock`] (or an equivalent external lock).

use infra_fs::{BranchLock, NormalizedPath};
use infra_git::VersionControl;

use crate::kind::ResourceKind;
use crate::settings::{self, RepositorySettingsSpec};
use crate::snapshot::{self, RepositorySnapshot};
use crate::{Record, Result, loader, mutator};

pub struct Repository<V> {
    vcs: V,
}

impl<V: VersionControl> Repository<V> {
    pub fn new(vcs: V) -> Self {
        Self { vcs }
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    fn root(&self) -> &NormalizedPath {
        self.vcs.local_repository_root()
    }

    fn branch(&self) -> Result<String> {
        Ok(self.vcs.current_branch()?)
    }

    fn branch_root(&self) -> Result<NormalizedPath> {
        Ok(self.vcs.branch_root()?)
    }

    /// Take the exclusive lock on this branch's working tree.
    pub fn lock(&self) -> Result<BranchLock> {
        Ok(BranchLock::acquire(&self.branch_root()?)?)
    }

    /// Check out the latest commit and load the whole branch.
    pub fn snapshot(&self) -> Result<RepositorySnapshot> {
        let branch_root = self.branch_root()?;
        let commit_ref = self.vcs.checkout()?;
        snapshot::build_snapshot(&branch_root, &commit_ref)
    }

    /// Load one kind, optionally checking out first.
    pub fn resources_by_kind(&self, kind: ResourceKind, checkout: bool) -> Result<Vec<Record>> {
        let branch_root = self.branch_root()?;
        if checkout {
            self.vcs.checkout()?;
        }
        loader::load_kind(&branch_root, kind)
    }

    /// Load boxes, core boxes and stores, optionally checking out first.
    pub fn boxes_and_stores(&self, checkout: bool) -> Result<Vec<Record>> {
        let branch_root = self.branch_root()?;
        if checkout {
            self.vcs.checkout()?;
        }
        loader::load_boxes_and_stores(&branch_root)
    }

    /// Load every governed kind, optionally checking out first.
    pub fn governed_resources(&self, checkout: bool) -> Result<Vec<Record>> {
        let branch_root = self.branch_root()?;
        if checkout {
            self.vcs.checkout()?;
        }
        loader::load_governed(&branch_root)
    }

    /// Check out the latest commit and read the settings file.
    pub fn settings(&self) -> Result<RepositorySettingsSpec> {
        self.vcs.checkout()?;
        settings::load_settings(self.root(), &self.branch()?)
    }

    /// Read one resource from the current working tree (no checkout).
    pub fn resource(&self, kind: ResourceKind, name: &str) -> Result<Record> {
        loader::load_resource(&self.branch_root()?, kind, name)
    }

    pub fn add(&self, record: &mut Record) -> Result<()> {
        mutator::add(self.root(), &self.branch()?, record)
    }

    pub fn update(&self, record: &mut Record) -> Result<()> {
        mutator::update(self.root(), &self.branch()?, record)
    }

    pub fn remove(&self, record: &Record) -> Result<()> {
        mutator::remove(self.root(), &self.branch()?, record)
    }

    /// Retire the legacy link directory.
    pub fn remove_link_resources(&self) -> Result<()> {
        mutator::remove_all(self.root(), &self.branch()?, ResourceKind::Th2Link)
    }
}
