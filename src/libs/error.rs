//! Error types for the store and the repositories.
//!
//! Two layers are kept apart:
//!
//! - [`StoreError`] is raised by the entity store itself (SQLite failures,
//!   serialization problems, primary-key collisions, malformed index queries).
//! - [`RepoError`] is what repository operations return. It carries the
//!   domain kinds (not found, conflict, validation) and wraps store failures
//!   unchanged.
//!
//! A mutation is committed first and audited second. When the audit append
//! fails after a successful commit the repository reports
//! [`RepoError::AuditAppend`], so callers can tell "nothing happened" apart
//! from "the change is stored but its audit record is missing".

use thiserror::Error;

/// Failures raised by the entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage failure: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("duplicate key in {table}: {id}")]
    DuplicateKey { table: &'static str, id: String },

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown index {index} on {table}")]
    UnknownIndex { table: &'static str, index: String },

    #[error("composite index {index} on {table} only supports exact-match lookups")]
    CompositeRange { table: &'static str, index: &'static str },

    #[error("table {table} is not part of the current transaction")]
    TableNotInScope { table: &'static str },

    #[error("record in {table} has no primary key field {field}")]
    MissingPrimaryKey { table: &'static str, field: &'static str },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures returned by repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The data change was committed but its audit record could not be written.
    #[error("change to {entity_id} was committed but the {action} audit record failed: {source}")]
    AuditAppend {
        action: &'static str,
        entity_id: String,
        #[source]
        source: StoreError,
    },
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        RepoError::NotFound { entity, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RepoError::Conflict(_))
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
