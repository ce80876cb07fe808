// error.rs — Error types for the audit subsystem.
//
// Append "never fails except on store errors": every failure here is a
// persistence failure, surfaced so the caller treats the governance action
// itself as failed. The log performs no retries — retrying a
// non-idempotent append could double-report an action.

use thiserror::Error;

use gov_store::StoreError;

/// Errors that can occur during audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The durable store rejected the operation.
    #[error("audit persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl AuditError {
    /// Stable machine-readable kind string for structured error surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::Persistence(_) => "persistence",
        }
    }
}
