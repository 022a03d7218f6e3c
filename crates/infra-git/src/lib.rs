//! Version-control collaborator for the infra repository
//!
//! The resource core only needs three things from version control: a
//! checkout that yields the current commit reference, the branch name,
//! and the local root under which every branch has its own working tree.

pub mod error;
pub mod provider;
pub mod working_copy;

pub use error::{Error, Result};
pub use provider::VersionControl;
pub use working_copy::WorkingCopy;
