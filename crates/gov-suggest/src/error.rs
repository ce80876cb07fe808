// error.rs — Error types for the suggestion subsystem.

use thiserror::Error;
use uuid::Uuid;

use gov_audit::AuditError;
use gov_store::StoreError;

use crate::suggestion::SuggestionStatus;

/// Errors that can occur in the suggestion lifecycle and scanner.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// Malformed identifiers or out-of-range parameters — caller error,
    /// never retried automatically.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The suggestion does not exist — or the caller may not see it.
    #[error("suggestion {0} not found")]
    NotFound(Uuid),

    /// The suggestion has already left the proposed state.
    #[error("suggestion already decided (current status '{current}')")]
    AlreadyDecided { current: SuggestionStatus },

    /// The paired audit append could not be staged.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// The durable store rejected the operation. Safe to retry `propose`
    /// (its trigger key makes retries idempotent); other operations are
    /// not retried by the engine.
    #[error("suggestion persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl SuggestError {
    /// Stable machine-readable kind string for structured error surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            SuggestError::InvalidArgument { .. } => "invalid_argument",
            SuggestError::NotFound(_) => "not_found",
            SuggestError::AlreadyDecided { .. } => "already_decided",
            SuggestError::Audit(_) => "persistence",
            SuggestError::Persistence(_) => "persistence",
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SuggestError::InvalidArgument {
            message: message.into(),
        }
    }
}
