//! Error taxonomy shared by the persistence layer and the export writers.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The identifier has no matching row.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A uniqueness rule or a reference to a missing parent row was violated.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// A delete was blocked because other rows still depend on the target.
    #[error("cannot delete {entity} {id}: still referenced by {dependent}")]
    Conflict {
        entity: &'static str,
        id: i64,
        dependent: &'static str,
    },

    /// The database file could not be opened or migrated.
    #[error("failed to open database at '{path}': {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The database directory could not be created.
    #[error("failed to prepare '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination was not writable or the document could not be rendered.
    #[error("failed to export report to '{path}': {reason}")]
    Export { path: PathBuf, reason: String },

    /// A field value was rejected before reaching the database.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// Any other SQLite failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        Error::NotFound { entity, id }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn export(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Export {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
