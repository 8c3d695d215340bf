//! Error types for the migration chain

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Errors surfaced by chain resolution and migration runs
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The requested target revision is not part of the chain
    #[error("unknown target revision '{0}'")]
    UnknownTarget(String),

    /// The database's recorded revision is not part of the chain
    #[error("database is at revision '{0}', which is not part of the migration chain")]
    UnrecognizedRevision(String),

    /// Upgrade requested to a revision earlier than the current one
    #[error("target revision '{target}' is behind the current revision '{current}'; downgrade instead")]
    TargetBehindCurrent { target: String, current: String },

    /// Downgrade requested to a revision later than the current one
    #[error("target revision '{target}' is ahead of the current revision '{current}'; upgrade instead")]
    TargetAheadOfCurrent { target: String, current: String },

    /// The chain cannot be resolved into a total order
    #[error("chain integrity violation: {0}")]
    ChainIntegrity(String),

    /// A change-set's delta failed; the step was rolled back
    #[error("change-set '{revision}' failed to execute: {source}")]
    Execution {
        /// The identifier of the failing change-set
        revision: String,
        /// The underlying database error
        source: SqlxError,
    },

    /// Reading or updating the current-version pointer failed
    #[error("failed to access the schema revision pointer: {0}")]
    Version(#[source] SqlxError),

    /// Introspecting the live schema failed
    #[error("schema introspection failed: {0}")]
    Introspection(#[source] SqlxError),
}

/// Type alias for Result with MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
