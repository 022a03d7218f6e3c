//! Version-control trait consumed by the resource core

use crate::Result;
use infra_fs::NormalizedPath;

/// Version-control operations the resource core depends on.
///
/// Callers are expected to hold the branch lock while invoking
/// `checkout`; implementations do not lock.
pub trait VersionControl {
    /// Bring the branch working tree to the latest state and return the
    /// commit reference it now points at.
    fn checkout(&self) -> Result<String>;

    /// Name of the branch this collaborator manages.
    fn current_branch(&self) -> Result<String>;

    /// Directory holding one working tree per branch.
    fn local_repository_root(&self) -> &NormalizedPath;

    /// `<local_repository_root>/<current_branch>`
    fn branch_root(&self) -> Result<NormalizedPath> {
        Ok(self.local_repository_root().join(&self.current_branch()?))
    }
}
