//! Shared test utilities for the infra-repo workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures built with `git2`
//! - [`branch`]: [`TestBranch`] builder for a branch working tree full of
//!   resource documents

pub mod branch;
pub mod git;

pub use branch::{TestBranch, resource_yaml};
