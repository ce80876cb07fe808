// matcher.rs — Which rules fire for an artifact event.
//
// A rule fires iff it is enabled, its trigger_artifact and event_type
// equal the event's, and its scope is global or the event's project.
// Matches come back in a deterministic order: global rules first, then
// project-scoped, ties broken by rule id. The store predicate language is
// a pure conjunction, so the global-or-project union is taken in code
// after a single indexed select.

use serde_json::json;
use tracing::debug;

use gov_store::{from_row, Predicate, Sort, Store};

use crate::error::TriggerError;
use crate::rule::{RuleScope, TriggerMatch, TriggerRule};

pub const TRIGGERS_TABLE: &str = "triggers";

/// Match an event against an in-memory rule set.
///
/// Pure: the store-backed [`TriggerMatcher`] loads rows and delegates
/// here, and callers holding per-call rule config can skip the store
/// entirely.
pub fn matching_rules(
    rules: &[TriggerRule],
    project_id: &str,
    artifact_type: &str,
    event_type: &str,
) -> Vec<TriggerMatch> {
    let mut fired: Vec<&TriggerRule> = rules
        .iter()
        .filter(|rule| {
            rule.is_enabled
                && rule.trigger_artifact == artifact_type
                && rule.event_type == event_type
                && rule
                    .project_id
                    .as_deref()
                    .map_or(true, |scope| scope == project_id)
        })
        .collect();
    fired.sort_by_key(|rule| (rule.scope() == RuleScope::Project, rule.id));
    fired.into_iter().map(TriggerMatch::from_rule).collect()
}

/// Store-backed matcher over the `triggers` table.
pub struct TriggerMatcher<'a> {
    store: &'a dyn Store,
}

impl<'a> TriggerMatcher<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Rules that fire when `event_type` happens to an `artifact_type`
    /// artifact in `project_id`.
    pub fn matches(
        &self,
        project_id: &str,
        artifact_type: &str,
        event_type: &str,
    ) -> Result<Vec<TriggerMatch>, TriggerError> {
        let rows = self.store.select_where(
            TRIGGERS_TABLE,
            &Predicate::new()
                .eq("trigger_artifact", artifact_type)
                .eq("event_type", event_type)
                .eq("is_enabled", json!(true)),
            &[Sort::asc("id")],
            usize::MAX,
        )?;
        let rules = rows
            .into_iter()
            .map(from_row::<TriggerRule>)
            .collect::<Result<Vec<_>, _>>()?;

        let fired = matching_rules(&rules, project_id, artifact_type, event_type);
        debug!(
            project = project_id,
            artifact = artifact_type,
            event = event_type,
            candidates = rules.len(),
            fired = fired.len(),
            "trigger match"
        );
        Ok(fired)
    }

    /// Store a rule so later [`matches`](Self::matches) calls see it.
    pub fn add_rule(&self, rule: &TriggerRule) -> Result<(), TriggerError> {
        self.store
            .insert(TRIGGERS_TABLE, gov_store::to_row(rule)?)?;
        Ok(())
    }
}
