//! Schema migration chain for the todo backend
//!
//! The schema lives as an ordered chain of change-sets, each carrying a
//! forward and a reverse SQL delta. The database records which change-set it
//! is currently at in a single-row pointer table, and the [`engine::Migrator`]
//! walks the chain forward (upgrade) or backward (downgrade) one atomic step
//! at a time.
//!
//! New change-sets are authored with the `migrate` binary, either as empty
//! skeletons or as best-effort drafts diffed from the declarative entity
//! model in [`model`].

pub mod chain;
pub mod changeset;
pub mod engine;
pub mod error;
pub mod model;
pub mod revisions;

pub use chain::Chain;
pub use changeset::ChangeSet;
pub use engine::Migrator;
pub use error::{MigrateError, MigrateResult};
