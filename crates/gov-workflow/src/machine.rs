// machine.rs — The change-request state machine.
//
// transition() is the single chokepoint for status changes. It runs three
// checks in order — subject exists, transition is defined, actor has
// authority — and then commits one unit of work pairing the status update
// with the audit append.
//
// The status update matches by id only, deliberately without an
// expected-status guard: under a true race between two deciders the last
// write wins the status column while both audit events are retained. The
// plan/commit split exists so that race is testable deterministically —
// build two plans against the same observed state, then commit both.

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use gov_audit::{ActionType, ApprovalEvent, AuditLog};
use gov_store::{from_row, to_row, Predicate, Sort, Store, StoreError, UnitOfWork};

use crate::change::{ChangeRequest, ChangeStatus};
use crate::error::WorkflowError;
use crate::role::{Actor, RolePolicy};

/// Table holding change requests.
pub const CHANGES_TABLE: &str = "change_requests";

/// A validated transition, ready to commit.
///
/// Holds the state observed at planning time; committing does not
/// re-validate, mirroring how two concurrent request handlers would each
/// have read "submitted" before either wrote.
#[derive(Debug)]
pub struct TransitionPlan {
    change_id: Uuid,
    target: ChangeStatus,
    event: ApprovalEvent,
}

impl TransitionPlan {
    pub fn event(&self) -> &ApprovalEvent {
        &self.event
    }
}

/// Validates and applies status transitions for change requests.
pub struct ChangeStateMachine<'a> {
    store: &'a dyn Store,
}

impl<'a> ChangeStateMachine<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Insert a fresh draft change request.
    ///
    /// Creation is not a governance action — no audit event until the
    /// draft is submitted.
    pub fn create(&self, change: &ChangeRequest) -> Result<(), WorkflowError> {
        self.store.insert(CHANGES_TABLE, to_row(change)?)?;
        Ok(())
    }

    /// Load a change request by id.
    pub fn get(&self, change_id: Uuid) -> Result<ChangeRequest, WorkflowError> {
        let rows = self.store.select_where(
            CHANGES_TABLE,
            &Predicate::new().eq("id", json!(change_id)),
            &[Sort::asc("seq")],
            1,
        )?;
        match rows.into_iter().next() {
            Some(row) => Ok(from_row(row)?),
            None => Err(WorkflowError::NotFound(change_id)),
        }
    }

    /// Validate and apply a transition, returning the audit event it
    /// produced. Exactly one event per successful transition.
    pub fn transition(
        &self,
        change_id: Uuid,
        actor: &Actor,
        target: ChangeStatus,
        comment: Option<&str>,
        policy: &RolePolicy,
    ) -> Result<ApprovalEvent, WorkflowError> {
        let plan = self.plan(change_id, actor, target, comment, policy)?;
        self.commit_plan(plan)
    }

    /// Validate a transition against the currently stored state without
    /// applying it.
    pub fn plan(
        &self,
        change_id: Uuid,
        actor: &Actor,
        target: ChangeStatus,
        comment: Option<&str>,
        policy: &RolePolicy,
    ) -> Result<TransitionPlan, WorkflowError> {
        let change = self.get(change_id)?;

        let Some(action) = transition_action(change.status, target) else {
            warn!(
                change = %change_id,
                from = %change.status,
                to = %target,
                "invalid transition attempt"
            );
            return Err(WorkflowError::InvalidTransition {
                from: change.status,
                to: target,
            });
        };

        let authorized = if is_decision(action) {
            policy.can_decide(actor.role)
        } else {
            policy.can_submit(actor.role)
        };
        if !authorized {
            warn!(
                change = %change_id,
                role = %actor.role,
                action = ?action,
                "transition forbidden"
            );
            return Err(WorkflowError::Forbidden {
                role: actor.role.to_string(),
                action: change.status.as_str().to_string() + " -> " + target.as_str(),
            });
        }

        let mut event = ApprovalEvent::new(&change.project_id, action, actor.to_ref())
            .with_change(change.id);
        if let Some(comment) = comment {
            event = event.with_comment(comment);
        }

        Ok(TransitionPlan {
            change_id,
            target,
            event,
        })
    }

    /// Commit a planned transition: status update and audit append land
    /// together or not at all.
    pub fn commit_plan(&self, plan: TransitionPlan) -> Result<ApprovalEvent, WorkflowError> {
        let mut patch = gov_store::Row::new();
        patch.insert("status".to_string(), json!(plan.target));
        patch.insert("updated_at".to_string(), json!(Utc::now()));

        let uow = UnitOfWork::new().update_where(
            CHANGES_TABLE,
            Predicate::new().eq("id", json!(plan.change_id)),
            patch,
        );
        let uow = AuditLog::stage_append(uow, &plan.event)?;

        match self.store.commit(uow) {
            Ok(_) => {
                info!(
                    change = %plan.change_id,
                    status = %plan.target,
                    event = %plan.event.event_id,
                    "transition committed"
                );
                Ok(plan.event)
            }
            // The change vanished between plan and commit.
            Err(StoreError::NoMatch { .. }) => Err(WorkflowError::NotFound(plan.change_id)),
            Err(err) => Err(err.into()),
        }
    }
}

/// The defined transition table. Returns the action a legal transition
/// records, or None when the move is not defined.
fn transition_action(from: ChangeStatus, to: ChangeStatus) -> Option<ActionType> {
    match (from, to) {
        (ChangeStatus::Draft, ChangeStatus::Submitted) => Some(ActionType::Submitted),
        (ChangeStatus::ChangesRequested, ChangeStatus::Submitted) => Some(ActionType::Submitted),
        (ChangeStatus::ChangesRequested, ChangeStatus::Draft) => Some(ActionType::Reopened),
        (ChangeStatus::Submitted, ChangeStatus::Approved) => Some(ActionType::Approved),
        (ChangeStatus::Submitted, ChangeStatus::ChangesRequested) => {
            Some(ActionType::ChangesRequested)
        }
        (ChangeStatus::Submitted, ChangeStatus::Rejected) => Some(ActionType::Rejected),
        _ => None,
    }
}

/// Decision transitions require decision authority; everything else only
/// requires membership.
fn is_decision(action: ActionType) -> bool {
    matches!(
        action,
        ActionType::Approved | ActionType::ChangesRequested | ActionType::Rejected
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use gov_audit::{replay_status, TimelineSubject};
    use gov_store::{MemoryStore, UniqueIndex};

    fn member() -> Actor {
        Actor::new("u-m", "Mara", Role::Member)
    }

    fn approver() -> Actor {
        Actor::new("u-a", "Ana", Role::Approver)
    }

    fn viewer() -> Actor {
        Actor::new("u-v", "Vik", Role::Viewer)
    }

    fn setup(store: &MemoryStore) -> (ChangeStateMachine<'_>, Uuid) {
        let machine = ChangeStateMachine::new(store);
        let change = ChangeRequest::new("proj-1", "Tighten SLA");
        let id = change.id;
        machine.create(&change).unwrap();
        (machine, id)
    }

    #[test]
    fn submit_then_approve_replays_to_approved() {
        let store = MemoryStore::new();
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        machine
            .transition(id, &member(), ChangeStatus::Submitted, None, &policy)
            .unwrap();
        machine
            .transition(id, &approver(), ChangeStatus::Approved, Some("ship it"), &policy)
            .unwrap();

        assert_eq!(machine.get(id).unwrap().status, ChangeStatus::Approved);

        // Exactly two events, chronological, replaying to the stored status.
        let log = AuditLog::new(&store);
        let events = log.timeline(&TimelineSubject::Change(id), 50).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action_type, ActionType::Submitted);
        assert_eq!(events[1].action_type, ActionType::Approved);
        assert_eq!(replay_status(&events), Some("approved"));
    }

    #[test]
    fn viewer_decision_is_forbidden_and_appends_nothing() {
        let store = MemoryStore::new();
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        machine
            .transition(id, &member(), ChangeStatus::Submitted, None, &policy)
            .unwrap();
        let result = machine.transition(id, &viewer(), ChangeStatus::Approved, None, &policy);
        assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));

        // Status untouched, timeline still shows only the submission.
        assert_eq!(machine.get(id).unwrap().status, ChangeStatus::Submitted);
        let events = AuditLog::new(&store)
            .timeline(&TimelineSubject::Change(id), 50)
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action_type, ActionType::Submitted);
    }

    #[test]
    fn member_cannot_decide() {
        let store = MemoryStore::new();
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        machine
            .transition(id, &member(), ChangeStatus::Submitted, None, &policy)
            .unwrap();
        let result = machine.transition(id, &member(), ChangeStatus::Rejected, None, &policy);
        assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));
    }

    #[test]
    fn undefined_transition_is_invalid_with_current_state() {
        let store = MemoryStore::new();
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        // Draft cannot be approved directly.
        let result = machine.transition(id, &approver(), ChangeStatus::Approved, None, &policy);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition {
                from: ChangeStatus::Draft,
                to: ChangeStatus::Approved,
            })
        ));
    }

    #[test]
    fn terminal_states_do_not_reopen() {
        let store = MemoryStore::new();
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        machine
            .transition(id, &member(), ChangeStatus::Submitted, None, &policy)
            .unwrap();
        machine
            .transition(id, &approver(), ChangeStatus::Rejected, None, &policy)
            .unwrap();

        let result = machine.transition(id, &member(), ChangeStatus::Submitted, None, &policy);
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn changes_requested_allows_resubmission_and_reopen() {
        let store = MemoryStore::new();
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        machine
            .transition(id, &member(), ChangeStatus::Submitted, None, &policy)
            .unwrap();
        machine
            .transition(id, &approver(), ChangeStatus::ChangesRequested, None, &policy)
            .unwrap();
        machine
            .transition(id, &member(), ChangeStatus::Draft, None, &policy)
            .unwrap();
        assert_eq!(machine.get(id).unwrap().status, ChangeStatus::Draft);

        let events = AuditLog::new(&store)
            .timeline(&TimelineSubject::Change(id), 50)
            .unwrap();
        assert_eq!(events[2].action_type, ActionType::Reopened);
        assert_eq!(replay_status(&events), Some("draft"));
    }

    #[test]
    fn unknown_change_is_not_found() {
        let store = MemoryStore::new();
        let machine = ChangeStateMachine::new(&store);
        let result = machine.transition(
            Uuid::new_v4(),
            &member(),
            ChangeStatus::Submitted,
            None,
            &RolePolicy::default(),
        );
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
    }

    #[test]
    fn concurrent_decisions_keep_both_events_last_status_wins() {
        let store = MemoryStore::new();
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        machine
            .transition(id, &member(), ChangeStatus::Submitted, None, &policy)
            .unwrap();

        // Two approvers both observe "submitted" before either commits.
        let approve = machine
            .plan(id, &approver(), ChangeStatus::Approved, None, &policy)
            .unwrap();
        let second = Actor::new("u-b", "Ben", Role::Owner);
        let reject = machine
            .plan(id, &second, ChangeStatus::Rejected, None, &policy)
            .unwrap();

        machine.commit_plan(approve).unwrap();
        machine.commit_plan(reject).unwrap();

        // Last write wins the status column...
        assert_eq!(machine.get(id).unwrap().status, ChangeStatus::Rejected);

        // ...but both decisions are in the audit trail.
        let events = AuditLog::new(&store)
            .timeline(&TimelineSubject::Change(id), 50)
            .unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].action_type, ActionType::Approved);
        assert_eq!(events[2].action_type, ActionType::Rejected);
    }

    #[test]
    fn failed_append_leaves_status_untouched() {
        // Force the audit insert to fail via a unique index on event_id,
        // and verify the paired status update is rolled back with it.
        let store = MemoryStore::new().with_index(UniqueIndex::new(
            gov_audit::EVENTS_TABLE,
            "uniq_event_id",
            ["event_id"],
        ));
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        let plan = machine
            .plan(id, &member(), ChangeStatus::Submitted, None, &policy)
            .unwrap();
        // Pre-insert a row claiming the same event id.
        store
            .insert(
                gov_audit::EVENTS_TABLE,
                to_row(plan.event()).unwrap(),
            )
            .unwrap();

        let result = machine.commit_plan(plan);
        assert!(matches!(result, Err(WorkflowError::Persistence(_))));
        assert_eq!(machine.get(id).unwrap().status, ChangeStatus::Draft);
    }

    #[test]
    fn transition_comment_lands_on_the_event() {
        let store = MemoryStore::new();
        let (machine, id) = setup(&store);
        let policy = RolePolicy::default();

        let event = machine
            .transition(id, &member(), ChangeStatus::Submitted, Some("ready"), &policy)
            .unwrap();
        assert_eq!(event.comment.as_deref(), Some("ready"));
        assert_eq!(event.change_id, Some(id));
    }
}
