// error.rs — Error types for the store abstraction.
//
// Uses `thiserror` to derive the standard Rust `Error` trait automatically.
// Each variant maps to a failure mode of the store collaborator.

use thiserror::Error;

/// Errors that can occur against the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert or update collided with a registered unique index.
    #[error("unique constraint '{index}' violated on table '{table}'")]
    UniqueViolation { table: String, index: String },

    /// A conditional update matched no row.
    #[error("no row in table '{table}' matched the update predicate")]
    NoMatch { table: String },

    /// A value could not be converted to or from a row.
    #[error("row serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A model serialized to something other than a JSON object.
    #[error("expected a JSON object row, got {found}")]
    NotARow { found: &'static str },

    /// The file backend could not read or write its state document.
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl StoreError {
    /// Stable machine-readable kind string for structured error surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::UniqueViolation { .. } => "unique_violation",
            StoreError::NoMatch { .. } => "no_match",
            StoreError::Serialization(_) => "serialization",
            StoreError::NotARow { .. } => "not_a_row",
            StoreError::Io { .. } => "io",
        }
    }

    /// True when the failure is the uniqueness constraint — callers with an
    /// idempotence key treat this as "already exists", not as an error.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}
