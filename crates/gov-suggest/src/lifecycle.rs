// lifecycle.rs — Propose and decide suggestions.
//
// propose is idempotent when a trigger key is supplied: the store's
// partial unique index rejects a second proposed row for the same
// (project, trigger_key), and propose answers the collision by returning
// the existing suggestion. That makes propose safe to retry and safe to
// race — whichever caller loses the insert gets the winner's row back.
//
// Both operations pair their state write with an audit event in one unit
// of work, like change-request transitions do.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use gov_audit::{ActionType, ActorRef, ApprovalEvent, AuditLog, EventMeta};
use gov_store::{from_row, to_row, Predicate, Sort, Store, StoreError, UnitOfWork, UniqueIndex};

use crate::error::SuggestError;
use crate::suggestion::{NewSuggestion, Suggestion, SuggestionStatus};

/// Table holding suggestions.
pub const SUGGESTIONS_TABLE: &str = "suggestions";

/// The partial unique index backing escalation dedup: at most one
/// *proposed* suggestion per (project_id, trigger_key). Rows with a NULL
/// trigger_key are unconstrained. Backends must register this on open.
pub fn trigger_key_index() -> UniqueIndex {
    UniqueIndex::new(
        SUGGESTIONS_TABLE,
        "uniq_proposed_trigger_key",
        ["project_id", "trigger_key"],
    )
    .with_filter(Predicate::new().eq("status", SuggestionStatus::Proposed.as_str()))
}

/// The decision a reviewer takes on a proposed suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected,
}

impl Outcome {
    fn status(&self) -> SuggestionStatus {
        match self {
            Outcome::Applied => SuggestionStatus::Applied,
            Outcome::Rejected => SuggestionStatus::Rejected,
        }
    }

    fn action_type(&self) -> ActionType {
        match self {
            Outcome::Applied => ActionType::SuggestionApplied,
            Outcome::Rejected => ActionType::SuggestionRejected,
        }
    }
}

/// Tracks suggestions through proposed → applied/rejected.
pub struct SuggestionLifecycle<'a> {
    store: &'a dyn Store,
}

impl<'a> SuggestionLifecycle<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Load a suggestion by id.
    pub fn get(&self, suggestion_id: Uuid) -> Result<Suggestion, SuggestError> {
        let rows = self.store.select_where(
            SUGGESTIONS_TABLE,
            &Predicate::new().eq("id", json!(suggestion_id)),
            &[Sort::asc("seq")],
            1,
        )?;
        match rows.into_iter().next() {
            Some(row) => Ok(from_row(row)?),
            None => Err(SuggestError::NotFound(suggestion_id)),
        }
    }

    /// Propose a suggestion. When it carries a trigger key that already
    /// has a proposed row in this project, the existing suggestion is
    /// returned instead of creating a duplicate.
    pub fn propose(
        &self,
        new: NewSuggestion,
        actor: &ActorRef,
    ) -> Result<Suggestion, SuggestError> {
        self.propose_at(new, actor, Utc::now()).map(|(s, _)| s)
    }

    /// As [`propose`](Self::propose), with an explicit clock. Returns the
    /// suggestion and whether this call created it.
    pub(crate) fn propose_at(
        &self,
        new: NewSuggestion,
        actor: &ActorRef,
        now: DateTime<Utc>,
    ) -> Result<(Suggestion, bool), SuggestError> {
        validate_new(&new)?;

        let trigger_key = new.trigger_key.clone();
        let suggestion = new.into_suggestion(now);

        let event = ApprovalEvent::new(
            &suggestion.project_id,
            ActionType::SuggestionProposed,
            actor.clone(),
        )
        .with_artifact(&suggestion.artifact_id)
        .with_meta(EventMeta::Opaque(json!({
            "suggestion_id": suggestion.id,
            "suggestion_type": suggestion.suggestion_type,
            "trigger_key": suggestion.trigger_key,
        })));

        let uow = UnitOfWork::new().insert(SUGGESTIONS_TABLE, to_row(&suggestion)?);
        let uow = AuditLog::stage_append(uow, &event)?;

        match self.store.commit(uow) {
            Ok(_) => {
                debug!(
                    suggestion = %suggestion.id,
                    kind = %suggestion.suggestion_type,
                    "suggestion proposed"
                );
                Ok((suggestion, true))
            }
            Err(err) if err.is_unique_violation() => {
                // Someone already holds this trigger key; hand back their row.
                let key = trigger_key.as_deref().unwrap_or_default();
                let existing = self.find_proposed(&suggestion.project_id, key)?;
                match existing {
                    Some(existing) => {
                        debug!(
                            suggestion = %existing.id,
                            trigger_key = key,
                            "propose deduplicated onto existing suggestion"
                        );
                        Ok((existing, false))
                    }
                    // The conflicting row was decided between our insert
                    // and this lookup; surface the original failure.
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Move a proposed suggestion to applied or rejected.
    pub fn decide(
        &self,
        suggestion_id: Uuid,
        outcome: Outcome,
        actor: &ActorRef,
    ) -> Result<Suggestion, SuggestError> {
        self.decide_at(suggestion_id, outcome, actor, Utc::now())
    }

    fn decide_at(
        &self,
        suggestion_id: Uuid,
        outcome: Outcome,
        actor: &ActorRef,
        now: DateTime<Utc>,
    ) -> Result<Suggestion, SuggestError> {
        let current = self.get(suggestion_id)?;
        if current.status != SuggestionStatus::Proposed {
            return Err(SuggestError::AlreadyDecided {
                current: current.status,
            });
        }

        let mut patch = gov_store::Row::new();
        patch.insert("status".to_string(), json!(outcome.status()));
        patch.insert("decided_at".to_string(), json!(now));
        if outcome == Outcome::Rejected {
            patch.insert("rejected_at".to_string(), json!(now));
        }

        let event = ApprovalEvent::new(&current.project_id, outcome.action_type(), actor.clone())
            .with_artifact(&current.artifact_id)
            .with_meta(EventMeta::Opaque(json!({
                "suggestion_id": suggestion_id,
                "suggestion_type": current.suggestion_type,
            })));

        // Conditional on status=proposed so a racing decision cannot
        // double-settle the suggestion.
        let uow = UnitOfWork::new().update_where(
            SUGGESTIONS_TABLE,
            Predicate::new()
                .eq("id", json!(suggestion_id))
                .eq("status", SuggestionStatus::Proposed.as_str()),
            patch,
        );
        let uow = AuditLog::stage_append(uow, &event)?;

        match self.store.commit(uow) {
            Ok(_) => {
                info!(
                    suggestion = %suggestion_id,
                    outcome = ?outcome,
                    "suggestion decided"
                );
                self.get(suggestion_id)
            }
            Err(StoreError::NoMatch { .. }) => {
                // Lost a race: the row exists but left proposed, or vanished.
                match self.get(suggestion_id) {
                    Ok(latest) => Err(SuggestError::AlreadyDecided {
                        current: latest.status,
                    }),
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_proposed(
        &self,
        project_id: &str,
        trigger_key: &str,
    ) -> Result<Option<Suggestion>, SuggestError> {
        let rows = self.store.select_where(
            SUGGESTIONS_TABLE,
            &Predicate::new()
                .eq("project_id", project_id)
                .eq("trigger_key", trigger_key)
                .eq("status", SuggestionStatus::Proposed.as_str()),
            &[Sort::asc("seq")],
            1,
        )?;
        rows.into_iter()
            .next()
            .map(|row| from_row(row).map_err(SuggestError::from))
            .transpose()
    }
}

fn validate_new(new: &NewSuggestion) -> Result<(), SuggestError> {
    if new.project_id.trim().is_empty() {
        return Err(SuggestError::invalid("project id must not be blank"));
    }
    if new.artifact_id.trim().is_empty() {
        return Err(SuggestError::invalid("artifact id must not be blank"));
    }
    if new.suggestion_type.trim().is_empty() {
        return Err(SuggestError::invalid("suggestion type must not be blank"));
    }
    if !(0.0..=1.0).contains(&new.confidence) {
        return Err(SuggestError::invalid(format!(
            "confidence must be within [0, 1], got {}",
            new.confidence
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_audit::TimelineSubject;
    use gov_store::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::new().with_index(trigger_key_index())
    }

    fn actor() -> ActorRef {
        ActorRef::new("u-1", "Ana", "member")
    }

    fn keyed(key: &str) -> NewSuggestion {
        NewSuggestion::new("proj-1", "art-1", "requirements", "quality")
            .with_rationale("section is ambiguous")
            .with_confidence(0.8)
            .with_trigger_key(key)
    }

    #[test]
    fn propose_and_get_round_trip() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let proposed = lifecycle.propose(keyed("k1"), &actor()).unwrap();
        let fetched = lifecycle.get(proposed.id).unwrap();
        assert_eq!(fetched, proposed);
        assert_eq!(fetched.status, SuggestionStatus::Proposed);
    }

    #[test]
    fn propose_with_same_trigger_key_is_idempotent() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);

        let first = lifecycle.propose(keyed("k1"), &actor()).unwrap();
        let second = lifecycle.propose(keyed("k1"), &actor()).unwrap();
        assert_eq!(second.id, first.id);

        // Only one suggestion row exists.
        let rows = store
            .select_where(SUGGESTIONS_TABLE, &Predicate::new(), &[], 100)
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn duplicate_propose_appends_no_audit_event() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        lifecycle.propose(keyed("k1"), &actor()).unwrap();
        lifecycle.propose(keyed("k1"), &actor()).unwrap();

        let events = AuditLog::new(&store)
            .timeline(&TimelineSubject::Artifact("art-1".to_string()), 50)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action_type, ActionType::SuggestionProposed);
    }

    #[test]
    fn keyless_proposes_never_deduplicate() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let new = || NewSuggestion::new("proj-1", "art-1", "requirements", "quality");
        let a = lifecycle.propose(new(), &actor()).unwrap();
        let b = lifecycle.propose(new(), &actor()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn decided_key_can_be_reused() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let first = lifecycle.propose(keyed("k1"), &actor()).unwrap();
        lifecycle
            .decide(first.id, Outcome::Rejected, &actor())
            .unwrap();

        // The partial index only constrains proposed rows.
        let again = lifecycle.propose(keyed("k1"), &actor()).unwrap();
        assert_ne!(again.id, first.id);
        assert_eq!(again.status, SuggestionStatus::Proposed);
    }

    #[test]
    fn decide_applies_and_stamps_timestamps() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let proposed = lifecycle.propose(keyed("k1"), &actor()).unwrap();

        let applied = lifecycle
            .decide(proposed.id, Outcome::Applied, &actor())
            .unwrap();
        assert_eq!(applied.status, SuggestionStatus::Applied);
        assert!(applied.decided_at.is_some());
        assert!(applied.rejected_at.is_none());
    }

    #[test]
    fn decide_rejected_also_stamps_rejected_at() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let proposed = lifecycle.propose(keyed("k1"), &actor()).unwrap();

        let rejected = lifecycle
            .decide(proposed.id, Outcome::Rejected, &actor())
            .unwrap();
        assert_eq!(rejected.status, SuggestionStatus::Rejected);
        assert!(rejected.decided_at.is_some());
        assert!(rejected.rejected_at.is_some());
    }

    #[test]
    fn deciding_twice_fails_with_already_decided() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let proposed = lifecycle.propose(keyed("k1"), &actor()).unwrap();
        lifecycle
            .decide(proposed.id, Outcome::Applied, &actor())
            .unwrap();

        let result = lifecycle.decide(proposed.id, Outcome::Rejected, &actor());
        assert!(matches!(
            result,
            Err(SuggestError::AlreadyDecided {
                current: SuggestionStatus::Applied,
            })
        ));
    }

    #[test]
    fn decide_unknown_suggestion_is_not_found() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let result = lifecycle.decide(Uuid::new_v4(), Outcome::Applied, &actor());
        assert!(matches!(result, Err(SuggestError::NotFound(_))));
    }

    #[test]
    fn decide_appends_its_audit_event() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let proposed = lifecycle.propose(keyed("k1"), &actor()).unwrap();
        lifecycle
            .decide(proposed.id, Outcome::Applied, &actor())
            .unwrap();

        let events = AuditLog::new(&store)
            .timeline(&TimelineSubject::Artifact("art-1".to_string()), 50)
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].action_type, ActionType::SuggestionApplied);
    }

    #[test]
    fn blank_project_id_is_invalid() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let new = NewSuggestion::new("  ", "art-1", "requirements", "quality");
        let result = lifecycle.propose(new, &actor());
        assert!(matches!(result, Err(SuggestError::InvalidArgument { .. })));
    }

    #[test]
    fn out_of_range_confidence_is_invalid() {
        let store = store();
        let lifecycle = SuggestionLifecycle::new(&store);
        let new = keyed("k1").with_confidence(1.5);
        let result = lifecycle.propose(new, &actor());
        assert!(matches!(result, Err(SuggestError::InvalidArgument { .. })));
    }
}
