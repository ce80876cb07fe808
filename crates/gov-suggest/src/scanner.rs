// scanner.rs — Stale-suggestion escalation scan.
//
// Finds proposed suggestions older than the staleness window and raises
// exactly one escalation suggestion per (subject, window). The dedup key
// is deterministic — sla.escalation.<suggestion_id>.<days>d — so however
// often the scan re-runs (hourly schedule, manual trigger, two schedulers
// racing), propose's trigger-key idempotence guarantees no duplicates.
//
// Escalation suggestions themselves are excluded from the candidate set;
// otherwise every escalation would be escalated again one window later,
// chaining indefinitely.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use gov_audit::ActorRef;
use gov_store::{from_row, Predicate, Sort, Store};

use crate::error::SuggestError;
use crate::lifecycle::{SuggestionLifecycle, SUGGESTIONS_TABLE};
use crate::suggestion::{NewSuggestion, Suggestion, SuggestionStatus};

/// suggestion_type stamped on escalation suggestions.
pub const SLA_ESCALATION_TYPE: &str = "sla_escalation";

/// Bounds the staleness window is clamped to.
pub const MIN_STALE_DAYS: i64 = 1;
pub const MAX_STALE_DAYS: i64 = 60;

/// Escalations carry a fixed high confidence: certainty that the subject
/// is stale, not a judgement of its content.
pub const ESCALATION_CONFIDENCE: f64 = 0.9;

/// What a scan did.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// How many stale proposed suggestions were examined.
    pub scanned: usize,
    /// Escalation suggestions newly created by this scan.
    pub created: Vec<Suggestion>,
}

/// Periodic/on-demand scan converting stale suggestions into escalations.
pub struct EscalationScanner<'a> {
    store: &'a dyn Store,
}

impl<'a> EscalationScanner<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Scan `project_id` for proposed suggestions older than `stale_days`
    /// (clamped to [1, 60]) and escalate each at most once per window.
    pub fn scan(&self, project_id: &str, stale_days: i64) -> Result<ScanOutcome, SuggestError> {
        self.scan_at(project_id, stale_days, Utc::now())
    }

    /// As [`scan`](Self::scan), with an explicit clock.
    pub fn scan_at(
        &self,
        project_id: &str,
        stale_days: i64,
        now: DateTime<Utc>,
    ) -> Result<ScanOutcome, SuggestError> {
        // Fail fast before any query executes.
        if project_id.trim().is_empty() {
            return Err(SuggestError::InvalidArgument {
                message: "project id must not be blank".to_string(),
            });
        }
        let days = stale_days.clamp(MIN_STALE_DAYS, MAX_STALE_DAYS);
        let cutoff = now - Duration::days(days);

        let rows = self.store.select_where(
            SUGGESTIONS_TABLE,
            &Predicate::new()
                .eq("project_id", project_id)
                .eq("status", SuggestionStatus::Proposed.as_str())
                .ne("suggestion_type", SLA_ESCALATION_TYPE)
                .lt("created_at", cutoff.to_rfc3339()),
            &[Sort::asc("created_at"), Sort::asc("seq")],
            usize::MAX,
        )?;

        let lifecycle = SuggestionLifecycle::new(self.store);
        let scanner_actor = scan_actor();
        let scanned = rows.len();
        let mut created = Vec::new();

        for row in rows {
            let stale: Suggestion = from_row(row)?;
            let new = NewSuggestion::new(
                &stale.project_id,
                &stale.artifact_id,
                &stale.target_artifact_type,
                SLA_ESCALATION_TYPE,
            )
            .with_rationale(format!(
                "suggestion {} has been awaiting a decision for more than {} days",
                stale.id, days
            ))
            .with_confidence(ESCALATION_CONFIDENCE)
            .with_trigger_key(escalation_key(&stale, days));

            let (escalation, fresh) = lifecycle.propose_at(new, &scanner_actor, now)?;
            if fresh {
                created.push(escalation);
            }
        }

        info!(
            project = project_id,
            window_days = days,
            scanned,
            created = created.len(),
            "escalation scan complete"
        );
        Ok(ScanOutcome { scanned, created })
    }
}

/// Deterministic dedup key for one (subject, window) pair.
fn escalation_key(stale: &Suggestion, days: i64) -> String {
    format!("sla.escalation.{}.{}d", stale.id, days)
}

fn scan_actor() -> ActorRef {
    ActorRef::new("system:escalation-scanner", "Escalation Scanner", "system")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::trigger_key_index;
    use gov_store::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::new().with_index(trigger_key_index())
    }

    fn actor() -> ActorRef {
        ActorRef::new("u-1", "Ana", "member")
    }

    /// A suggestion proposed at `at`, returning its id.
    fn propose_at(store: &MemoryStore, at: DateTime<Utc>) -> Suggestion {
        let lifecycle = SuggestionLifecycle::new(store);
        let new = NewSuggestion::new("proj-1", "art-1", "requirements", "quality")
            .with_rationale("section is ambiguous")
            .with_confidence(0.8);
        lifecycle.propose_at(new, &actor(), at).unwrap().0
    }

    fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        now - Duration::days(days)
    }

    #[test]
    fn stale_suggestion_is_escalated_once() {
        let store = store();
        let now = Utc::now();
        let stale = propose_at(&store, days_ago(now, 8));

        let scanner = EscalationScanner::new(&store);
        let outcome = scanner.scan_at("proj-1", 7, now).unwrap();
        assert_eq!(outcome.scanned, 1);
        assert_eq!(outcome.created.len(), 1);

        let escalation = &outcome.created[0];
        assert_eq!(escalation.suggestion_type, SLA_ESCALATION_TYPE);
        assert_eq!(escalation.confidence, ESCALATION_CONFIDENCE);
        assert_eq!(
            escalation.trigger_key.as_deref(),
            Some(format!("sla.escalation.{}.7d", stale.id).as_str())
        );
        assert!(escalation.rationale.contains("7 days"));
    }

    #[test]
    fn second_scan_creates_nothing() {
        let store = store();
        let now = Utc::now();
        propose_at(&store, days_ago(now, 8));

        let scanner = EscalationScanner::new(&store);
        let first = scanner.scan_at("proj-1", 7, now).unwrap();
        assert_eq!(first.created.len(), 1);

        // Re-run a day later: same stale subject, same window, zero new rows.
        let second = scanner
            .scan_at("proj-1", 7, now + Duration::days(1))
            .unwrap();
        assert_eq!(second.scanned, 1);
        assert_eq!(second.created.len(), 0);
    }

    #[test]
    fn fresh_suggestions_are_not_escalated() {
        let store = store();
        let now = Utc::now();
        propose_at(&store, days_ago(now, 3));

        let outcome = EscalationScanner::new(&store)
            .scan_at("proj-1", 7, now)
            .unwrap();
        assert_eq!(outcome.scanned, 0);
        assert!(outcome.created.is_empty());
    }

    #[test]
    fn decided_suggestions_are_not_escalated() {
        let store = store();
        let now = Utc::now();
        let old = propose_at(&store, days_ago(now, 10));
        SuggestionLifecycle::new(&store)
            .decide(old.id, crate::lifecycle::Outcome::Applied, &actor())
            .unwrap();

        let outcome = EscalationScanner::new(&store)
            .scan_at("proj-1", 7, now)
            .unwrap();
        assert_eq!(outcome.scanned, 0);
    }

    #[test]
    fn escalations_do_not_chain() {
        let store = store();
        let now = Utc::now();
        propose_at(&store, days_ago(now, 8));

        let scanner = EscalationScanner::new(&store);
        scanner.scan_at("proj-1", 7, now).unwrap();

        // Ten days later the escalation row itself is past the window, but
        // escalation-typed suggestions are excluded from the candidate set.
        let later = scanner
            .scan_at("proj-1", 7, now + Duration::days(10))
            .unwrap();
        assert!(later
            .created
            .iter()
            .all(|s| s.suggestion_type == SLA_ESCALATION_TYPE));
        assert_eq!(later.created.len(), 0);
    }

    #[test]
    fn different_windows_escalate_separately() {
        let store = store();
        let now = Utc::now();
        let stale = propose_at(&store, days_ago(now, 20));

        let scanner = EscalationScanner::new(&store);
        let week = scanner.scan_at("proj-1", 7, now).unwrap();
        let fortnight = scanner.scan_at("proj-1", 14, now).unwrap();

        assert_eq!(week.created.len(), 1);
        assert_eq!(fortnight.created.len(), 1);
        assert_eq!(
            fortnight.created[0].trigger_key.as_deref(),
            Some(format!("sla.escalation.{}.14d", stale.id).as_str())
        );
    }

    #[test]
    fn window_is_clamped() {
        let store = store();
        let now = Utc::now();
        propose_at(&store, days_ago(now, 2));

        // 0 clamps to 1, so a 2-day-old suggestion is stale.
        let outcome = EscalationScanner::new(&store)
            .scan_at("proj-1", 0, now)
            .unwrap();
        assert_eq!(outcome.created.len(), 1);
        assert!(outcome.created[0]
            .trigger_key
            .as_deref()
            .unwrap()
            .ends_with(".1d"));
    }

    #[test]
    fn oversized_window_is_clamped() {
        let store = store();
        let now = Utc::now();
        propose_at(&store, days_ago(now, 61));

        // 100 clamps to 60, so the 61-day-old suggestion is stale and the
        // dedup key records the clamped window.
        let outcome = EscalationScanner::new(&store)
            .scan_at("proj-1", 100, now)
            .unwrap();
        assert_eq!(outcome.created.len(), 1);
        assert!(outcome.created[0]
            .trigger_key
            .as_deref()
            .unwrap()
            .ends_with(".60d"));
    }

    #[test]
    fn blank_project_fails_fast() {
        let store = store();
        let result = EscalationScanner::new(&store).scan("   ", 7);
        assert!(matches!(result, Err(SuggestError::InvalidArgument { .. })));
    }

    #[test]
    fn other_projects_are_untouched() {
        let store = store();
        let now = Utc::now();
        propose_at(&store, days_ago(now, 8)); // proj-1

        let outcome = EscalationScanner::new(&store)
            .scan_at("proj-2", 7, now)
            .unwrap();
        assert_eq!(outcome.scanned, 0);
        assert!(outcome.created.is_empty());
    }
}
