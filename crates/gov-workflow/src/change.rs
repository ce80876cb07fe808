// change.rs — Change request data model.
//
// A change request is the governed artifact of the approval workflow. It
// is owned by a project, mutated only through the state machine, and never
// destroyed — approved and rejected are terminal resting states, not
// deletions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a change request sits in the governance workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Draft,
    Submitted,
    Approved,
    ChangesRequested,
    Rejected,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Draft => "draft",
            ChangeStatus::Submitted => "submitted",
            ChangeStatus::Approved => "approved",
            ChangeStatus::ChangesRequested => "changes_requested",
            ChangeStatus::Rejected => "rejected",
        }
    }

    /// Approved and rejected changes never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChangeStatus::Approved | ChangeStatus::Rejected)
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ChangeStatus::Draft),
            "submitted" => Ok(ChangeStatus::Submitted),
            "approved" => Ok(ChangeStatus::Approved),
            "changes_requested" => Ok(ChangeStatus::ChangesRequested),
            "rejected" => Ok(ChangeStatus::Rejected),
            other => Err(format!("unknown change status '{}'", other)),
        }
    }
}

/// How urgent the change is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Assessed blast radius of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Structured impact assessment attached to a change request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub summary: String,
    /// Artifacts the change would touch.
    pub affected_artifact_ids: Vec<String>,
    pub risk_level: RiskLevel,
}

impl Default for ImpactAnalysis {
    fn default() -> Self {
        Self {
            summary: String::new(),
            affected_artifact_ids: Vec::new(),
            risk_level: RiskLevel::Low,
        }
    }
}

/// A governed change request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: Uuid,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub status: ChangeStatus,
    pub impact_analysis: ImpactAnalysis,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChangeRequest {
    /// Create a fresh draft.
    pub fn new(project_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id: project_id.into(),
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            tags: Vec::new(),
            status: ChangeStatus::Draft,
            impact_analysis: ImpactAnalysis::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description and return self (builder pattern).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority and return self.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Add a tag and return self.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the impact analysis and return self.
    pub fn with_impact(mut self, impact: ImpactAnalysis) -> Self {
        self.impact_analysis = impact;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_change_is_a_draft() {
        let change = ChangeRequest::new("proj-1", "Tighten SLA");
        assert_eq!(change.status, ChangeStatus::Draft);
        assert_eq!(change.priority, Priority::Medium);
        assert!(!change.status.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ChangeStatus::ChangesRequested).unwrap();
        assert_eq!(json, "\"changes_requested\"");
    }

    #[test]
    fn status_round_trips_through_from_str() {
        for status in [
            ChangeStatus::Draft,
            ChangeStatus::Submitted,
            ChangeStatus::Approved,
            ChangeStatus::ChangesRequested,
            ChangeStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ChangeStatus>().unwrap(), status);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(ChangeStatus::Approved.is_terminal());
        assert!(ChangeStatus::Rejected.is_terminal());
        assert!(!ChangeStatus::ChangesRequested.is_terminal());
    }

    #[test]
    fn serialization_round_trip() {
        let change = ChangeRequest::new("proj-1", "Tighten SLA")
            .with_description("reduce stale window")
            .with_tag("sla")
            .with_impact(ImpactAnalysis {
                summary: "low".to_string(),
                affected_artifact_ids: vec!["art-1".to_string()],
                risk_level: RiskLevel::Medium,
            });
        let json = serde_json::to_string(&change).unwrap();
        let restored: ChangeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, change);
    }
}
