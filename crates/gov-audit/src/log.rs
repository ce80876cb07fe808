// log.rs — Append-only audit log over the durable store.
//
// Append is the only write path; there is no update or delete. Queries are
// bounded: the limit is clamped to [10, 500] at this boundary so no caller
// can trigger an unbounded scan. Storage order is most-recent-first
// (created_at desc, seq desc); results are re-sorted to chronological for
// presentation and replay.

use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use gov_store::{to_row, Predicate, Sort, Store, UnitOfWork};

use crate::error::AuditError;
use crate::event::ApprovalEvent;

/// Table holding the audit trail.
pub const EVENTS_TABLE: &str = "approval_events";

/// Smallest timeline page a caller can request.
pub const MIN_TIMELINE_LIMIT: usize = 10;

/// Largest timeline page a caller can request.
pub const MAX_TIMELINE_LIMIT: usize = 500;

/// What a timeline query is about.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineSubject {
    /// All events for one change request.
    Change(Uuid),
    /// All events for one governed artifact.
    Artifact(String),
    /// The whole project's governance feed.
    Project(String),
}

impl TimelineSubject {
    fn predicate(&self) -> Predicate {
        match self {
            TimelineSubject::Change(change_id) => {
                Predicate::new().eq("change_id", json!(change_id))
            }
            TimelineSubject::Artifact(artifact_id) => {
                Predicate::new().eq("artifact_id", artifact_id.as_str())
            }
            TimelineSubject::Project(project_id) => {
                Predicate::new().eq("project_id", project_id.as_str())
            }
        }
    }
}

/// The append-only event log.
pub struct AuditLog<'a> {
    store: &'a dyn Store,
}

impl<'a> AuditLog<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Append an event, returning its id.
    ///
    /// Fails only on store errors; when it does, the caller must treat the
    /// governance action itself as failed — a state change without its
    /// audit event must never land.
    pub fn append(&self, event: &ApprovalEvent) -> Result<Uuid, AuditError> {
        let row = to_row(event)?;
        self.store.insert(EVENTS_TABLE, row)?;
        debug!(
            event_id = %event.event_id,
            action = ?event.action_type,
            project = %event.project_id,
            "audit event appended"
        );
        Ok(event.event_id)
    }

    /// Stage an append into a unit of work, for callers that must pair the
    /// event with a state update atomically.
    pub fn stage_append(uow: UnitOfWork, event: &ApprovalEvent) -> Result<UnitOfWork, AuditError> {
        Ok(uow.insert(EVENTS_TABLE, to_row(event)?))
    }

    /// Return a subject's events in chronological order.
    ///
    /// `limit` is clamped to [[`MIN_TIMELINE_LIMIT`], [`MAX_TIMELINE_LIMIT`]];
    /// when more events exist than the limit, the most recent ones win.
    pub fn timeline(
        &self,
        subject: &TimelineSubject,
        limit: usize,
    ) -> Result<Vec<ApprovalEvent>, AuditError> {
        let limit = limit.clamp(MIN_TIMELINE_LIMIT, MAX_TIMELINE_LIMIT);
        let rows = self.store.select_where(
            EVENTS_TABLE,
            &subject.predicate(),
            &[Sort::desc("created_at"), Sort::desc("seq")],
            limit,
        )?;
        let mut events = rows
            .into_iter()
            .map(gov_store::from_row::<ApprovalEvent>)
            .collect::<Result<Vec<_>, _>>()?;
        events.reverse();
        Ok(events)
    }
}
