// error.rs — Error type for trigger matching.

use thiserror::Error;

use gov_store::StoreError;

/// Errors from the store-backed matcher. Pure matching over an in-memory
/// rule slice cannot fail.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("trigger persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl TriggerError {
    /// Stable machine-readable kind string for structured error surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerError::Persistence(_) => "persistence",
        }
    }
}
