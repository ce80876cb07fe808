// event.rs — Approval event data model.
//
// Every governance action (transition, suggestion decision, artifact edit)
// is recorded as one ApprovalEvent. Events are immutable once written;
// ordering is by created_at with the store-assigned seq breaking ties.
// The actor's role is captured as a plain string — the role *at the time
// of the action*, not a live reference that could drift later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use gov_diff::RevisionDiff;

use crate::hasher;

/// What governance action this event records. Matches the transition or
/// lifecycle operation name, snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A change request was submitted for decision.
    Submitted,
    /// A decision authority approved a submitted change.
    Approved,
    /// A decision authority sent a submitted change back for rework.
    ChangesRequested,
    /// A decision authority rejected a submitted change.
    Rejected,
    /// A change was pulled back from changes_requested to draft.
    Reopened,
    /// A suggestion was proposed against an artifact.
    SuggestionProposed,
    /// A proposed suggestion was applied.
    SuggestionApplied,
    /// A proposed suggestion was rejected.
    SuggestionRejected,
    /// An artifact revision was edited (carries a diff payload).
    ArtifactEdited,
}

impl ActionType {
    /// The subject status this action leaves behind, if the action is a
    /// status-bearing one. Folding these over a chronological timeline
    /// reconstructs the subject's current status.
    pub fn resulting_status(&self) -> Option<&'static str> {
        match self {
            ActionType::Submitted => Some("submitted"),
            ActionType::Approved => Some("approved"),
            ActionType::ChangesRequested => Some("changes_requested"),
            ActionType::Rejected => Some("rejected"),
            ActionType::Reopened => Some("draft"),
            ActionType::SuggestionProposed => Some("proposed"),
            ActionType::SuggestionApplied => Some("applied"),
            ActionType::SuggestionRejected => Some("rejected"),
            ActionType::ArtifactEdited => None,
        }
    }
}

/// Who performed an action, snapshotted at action time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub user_id: String,
    pub display_name: String,
    /// Role held when the action happened (e.g. "approver").
    pub role: String,
}

impl ActorRef {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role: role.into(),
        }
    }
}

/// Structured event payload: a revision diff where one applies, with an
/// opaque JSON fallback for payloads this version does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventMeta {
    Diff(RevisionDiff),
    Opaque(Value),
}

/// A single immutable audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalEvent {
    /// Unique identifier for this event.
    pub event_id: Uuid,

    /// The project the action happened in.
    pub project_id: String,

    /// The governed artifact this event concerns, if any.
    pub artifact_id: Option<String>,

    /// The change request this event concerns, if any.
    pub change_id: Option<Uuid>,

    /// What action was performed.
    pub action_type: ActionType,

    /// Who performed it, with their role at the time.
    pub actor: ActorRef,

    /// Free-form comment supplied with the action.
    pub comment: Option<String>,

    /// Structured payload (e.g. the diff an edit carried).
    #[serde(default)]
    pub meta: Option<EventMeta>,

    /// SHA-256 of the canonical serialization of `meta`, when present.
    pub payload_hash: Option<String>,

    /// When this event occurred (UTC).
    pub created_at: DateTime<Utc>,
}

impl ApprovalEvent {
    /// Create a new event with the current timestamp and a random UUID.
    pub fn new(project_id: impl Into<String>, action_type: ActionType, actor: ActorRef) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            project_id: project_id.into(),
            artifact_id: None,
            change_id: None,
            action_type,
            actor,
            comment: None,
            meta: None,
            payload_hash: None,
            created_at: Utc::now(),
        }
    }

    /// Set the change request this event concerns and return self.
    pub fn with_change(mut self, change_id: Uuid) -> Self {
        self.change_id = Some(change_id);
        self
    }

    /// Set the artifact this event concerns and return self.
    pub fn with_artifact(mut self, artifact_id: impl Into<String>) -> Self {
        self.artifact_id = Some(artifact_id.into());
        self
    }

    /// Set the comment and return self.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Attach a structured payload and stamp its hash.
    pub fn with_meta(mut self, meta: EventMeta) -> Self {
        let as_value = match &meta {
            EventMeta::Opaque(value) => value.clone(),
            EventMeta::Diff(diff) => {
                serde_json::to_value(diff).unwrap_or(Value::Null)
            }
        };
        self.payload_hash = Some(hasher::hash_value(&as_value));
        self.meta = Some(meta);
        self
    }

    /// Verify the payload hash against the current meta content.
    pub fn verify_payload_hash(&self) -> bool {
        match (&self.meta, &self.payload_hash) {
            (None, None) => true,
            (Some(meta), Some(hash)) => {
                let as_value = match meta {
                    EventMeta::Opaque(value) => value.clone(),
                    EventMeta::Diff(diff) => serde_json::to_value(diff).unwrap_or(Value::Null),
                };
                &hasher::hash_value(&as_value) == hash
            }
            _ => false,
        }
    }
}
