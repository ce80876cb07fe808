// rule.rs — Trigger rule and match models.
//
// A TriggerRule is declarative configuration: when `event_type` happens to
// an artifact of `trigger_artifact` kind, automation with `ai_intent`
// should run `ai_steps` against `affected_artifacts`. Rules scoped to a
// project carry its id; global rules leave it unset and apply everywhere.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How loudly a fired rule should surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub id: Uuid,
    /// Artifact kind the rule watches (e.g. "requirements").
    pub trigger_artifact: String,
    /// Event kind the rule fires on (e.g. "updated", "approved").
    pub event_type: String,
    /// What the automation is meant to achieve, human-readable.
    pub ai_intent: String,
    /// Ordered steps the automation would take. Order is part of the
    /// contract; consumers replay them as written.
    pub ai_steps: Vec<String>,
    /// Artifact kinds the automation would touch.
    pub affected_artifacts: Vec<String>,
    pub severity: Severity,
    /// Whether the consumer may run the steps without human sign-off.
    pub auto_execute: bool,
    /// Shown to users when the rule fires.
    pub explanation: String,
    /// Project the rule is scoped to; `None` means global.
    #[serde(default)]
    pub project_id: Option<String>,
    pub is_enabled: bool,
}

impl TriggerRule {
    pub fn new(
        trigger_artifact: impl Into<String>,
        event_type: impl Into<String>,
        ai_intent: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trigger_artifact: trigger_artifact.into(),
            event_type: event_type.into(),
            ai_intent: ai_intent.into(),
            ai_steps: Vec::new(),
            affected_artifacts: Vec::new(),
            severity: Severity::Info,
            auto_execute: false,
            explanation: String::new(),
            project_id: None,
            is_enabled: true,
        }
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.ai_steps.push(step.into());
        self
    }

    pub fn with_affected(mut self, artifact: impl Into<String>) -> Self {
        self.affected_artifacts.push(artifact.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_auto_execute(mut self, auto_execute: bool) -> Self {
        self.auto_execute = auto_execute;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn for_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }

    pub fn scope(&self) -> RuleScope {
        if self.project_id.is_some() {
            RuleScope::Project
        } else {
            RuleScope::Global
        }
    }
}

/// Whether a matched rule came from global or project-scoped configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    Global,
    Project,
}

/// One rule that fired for an event. Data only — carries everything a
/// consumer needs to present or execute the automation, but no callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerMatch {
    pub rule_id: Uuid,
    pub ai_intent: String,
    pub ai_steps: Vec<String>,
    pub affected_artifacts: Vec<String>,
    pub severity: Severity,
    pub auto_execute: bool,
    pub explanation: String,
    pub scope: RuleScope,
}

impl TriggerMatch {
    pub(crate) fn from_rule(rule: &TriggerRule) -> Self {
        Self {
            rule_id: rule.id,
            ai_intent: rule.ai_intent.clone(),
            ai_steps: rule.ai_steps.clone(),
            affected_artifacts: rule.affected_artifacts.clone(),
            severity: rule.severity,
            auto_execute: rule.auto_execute,
            explanation: rule.explanation.clone(),
            scope: rule.scope(),
        }
    }
}
