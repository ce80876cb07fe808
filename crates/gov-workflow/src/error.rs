// error.rs — Error types for the workflow subsystem.
//
// The taxonomy mirrors what callers need to distinguish: caller mistakes
// (NotFound), authority failures (Forbidden), state-machine violations
// (InvalidTransition, surfaced with the current state for diagnosis), and
// store failures (Persistence). Nothing here is retried internally.

use thiserror::Error;
use uuid::Uuid;

use gov_audit::AuditError;
use gov_store::StoreError;

use crate::change::ChangeStatus;

/// Errors that can occur while transitioning a change request.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The change request does not exist — or the caller may not see it;
    /// the two are deliberately indistinguishable.
    #[error("change request {0} not found")]
    NotFound(Uuid),

    /// The actor's role lacks the authority for this transition.
    #[error("role '{role}' may not perform '{action}'")]
    Forbidden { role: String, action: String },

    /// The requested transition is not defined from the current status.
    #[error("invalid transition from '{from}' to '{to}'")]
    InvalidTransition {
        from: ChangeStatus,
        to: ChangeStatus,
    },

    /// The paired audit append could not be staged.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// The durable store rejected the operation.
    #[error("workflow persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl WorkflowError {
    /// Stable machine-readable kind string for structured error surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::NotFound(_) => "not_found",
            WorkflowError::Forbidden { .. } => "forbidden",
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::Audit(_) => "persistence",
            WorkflowError::Persistence(_) => "persistence",
        }
    }
}
