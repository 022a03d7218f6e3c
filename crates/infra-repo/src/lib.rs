//! Resource synchronization core.
//!
//! Treats a directory tree inside a branch working copy as a database of
//! declarative resources, one YAML document per resource:
//!
//! ```text
//! <root>/<branch>/
//!   infra-mgr-config.yml      repository settings
//!   boxes/codec.yml           Th2Box "codec"
//!   core/mstore.yml           Th2Mstore "mstore"
//!   dictionaries/fix.yaml     Th2Dictionary "fix"
//! ```
//!
//! [`loader`] scans and validates, [`mutator`] adds, updates and removes
//! documents, [`snapshot`] pairs a full branch load with a commit
//! reference and the decoded [`settings`]. None of these lock; callers
//! hold a [`infra_fs::BranchLock`] (or equivalent) around each call.

pub mod codec;
pub mod collision;
pub mod error;
pub mod kind;
pub mod loader;
pub mod logging;
pub mod mutator;
pub mod record;
pub mod repository;
pub mod settings;
pub mod snapshot;

pub use collision::{Admission, NameAccumulator};
pub use error::{Error, Result};
pub use kind::{KindDescriptor, ResourceKind};
pub use record::{Metadata, Payload, Provenance, Record};
pub use repository::Repository;
pub use settings::{LogLevel, Propagation, RepositorySettingsSpec};
pub use snapshot::{RepositoryMap, RepositorySnapshot};
