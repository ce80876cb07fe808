// suggestion.rs — Suggestion data model.
//
// A suggestion is AI-generated advice attached to a governed artifact:
// proposed, then either applied or rejected by a human. The trigger_key
// column is the idempotence token: at most one *proposed* suggestion per
// (project_id, trigger_key) may exist, enforced by a partial unique index
// in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use gov_diff::RevisionDiff;

/// Where a suggestion sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Proposed,
    Applied,
    Rejected,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Proposed => "proposed",
            SuggestionStatus::Applied => "applied",
            SuggestionStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The concrete change a suggestion proposes: a structured revision diff
/// where one applies, with an opaque JSON fallback for payload shapes this
/// version does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionPatch {
    Diff(RevisionDiff),
    Opaque(Value),
}

/// A suggestion attached to a governed artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub project_id: String,
    pub artifact_id: String,
    /// What kind of artifact the suggestion targets (e.g. "change_requests").
    pub target_artifact_type: String,
    /// Classifier such as "quality_improvement" or "sla_escalation".
    pub suggestion_type: String,
    /// Why the suggestion was made, human-readable.
    pub rationale: String,
    /// Confidence in [0, 1]. For escalations this signals certainty of
    /// staleness, not of content.
    pub confidence: f64,
    /// The proposed change, if the suggestion carries one.
    #[serde(default)]
    pub patch: Option<SuggestionPatch>,
    pub status: SuggestionStatus,
    /// Idempotence/dedup token; unique per (project, key) while proposed.
    pub trigger_key: Option<String>,
    /// The audit event that caused this suggestion, if automation-born.
    pub triggered_by_event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Set when the suggestion is applied or rejected.
    pub decided_at: Option<DateTime<Utc>>,
    /// Additionally set when the suggestion is rejected.
    pub rejected_at: Option<DateTime<Utc>>,
}

/// Input to `SuggestionLifecycle::propose` (builder pattern).
#[derive(Debug, Clone)]
pub struct NewSuggestion {
    pub project_id: String,
    pub artifact_id: String,
    pub target_artifact_type: String,
    pub suggestion_type: String,
    pub rationale: String,
    pub confidence: f64,
    pub patch: Option<SuggestionPatch>,
    pub trigger_key: Option<String>,
    pub triggered_by_event_id: Option<Uuid>,
}

impl NewSuggestion {
    pub fn new(
        project_id: impl Into<String>,
        artifact_id: impl Into<String>,
        target_artifact_type: impl Into<String>,
        suggestion_type: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            artifact_id: artifact_id.into(),
            target_artifact_type: target_artifact_type.into(),
            suggestion_type: suggestion_type.into(),
            rationale: String::new(),
            confidence: 0.5,
            patch: None,
            trigger_key: None,
            triggered_by_event_id: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_patch(mut self, patch: SuggestionPatch) -> Self {
        self.patch = Some(patch);
        self
    }

    pub fn with_trigger_key(mut self, trigger_key: impl Into<String>) -> Self {
        self.trigger_key = Some(trigger_key.into());
        self
    }

    pub fn with_triggered_by(mut self, event_id: Uuid) -> Self {
        self.triggered_by_event_id = Some(event_id);
        self
    }

    /// Materialize into a proposed suggestion created at `now`.
    pub(crate) fn into_suggestion(self, now: DateTime<Utc>) -> Suggestion {
        Suggestion {
            id: Uuid::new_v4(),
            project_id: self.project_id,
            artifact_id: self.artifact_id,
            target_artifact_type: self.target_artifact_type,
            suggestion_type: self.suggestion_type,
            rationale: self.rationale,
            confidence: self.confidence,
            patch: self.patch,
            status: SuggestionStatus::Proposed,
            trigger_key: self.trigger_key,
            triggered_by_event_id: self.triggered_by_event_id,
            created_at: now,
            decided_at: None,
            rejected_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&SuggestionStatus::Proposed).unwrap();
        assert_eq!(json, "\"proposed\"");
    }

    #[test]
    fn suggestion_serialization_round_trip() {
        let suggestion = NewSuggestion::new("proj-1", "art-1", "requirements", "quality")
            .with_rationale("section is ambiguous")
            .with_confidence(0.8)
            .with_patch(SuggestionPatch::Opaque(json!({"hint": "split it"})))
            .with_trigger_key("quality.art-1.s3")
            .into_suggestion(Utc::now());

        let json = serde_json::to_string(&suggestion).unwrap();
        let restored: Suggestion = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, suggestion);
    }

    #[test]
    fn new_suggestion_starts_proposed_and_undecided() {
        let suggestion =
            NewSuggestion::new("p", "a", "requirements", "quality").into_suggestion(Utc::now());
        assert_eq!(suggestion.status, SuggestionStatus::Proposed);
        assert!(suggestion.decided_at.is_none());
        assert!(suggestion.rejected_at.is_none());
        assert!(suggestion.trigger_key.is_none());
    }
}
