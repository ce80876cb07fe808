// replay.rs — Reconstruct a subject's status from its event history.
//
// The audit trail is the source of truth: folding a subject's events in
// chronological order must land on the same status the subject row
// carries. This is the invariant the timeline tests pin down, and what a
// repair job would use if the two ever disagreed.

use crate::event::ApprovalEvent;

/// Fold a chronological event sequence down to the resulting status.
///
/// Returns None when no event in the sequence bears a status (e.g. only
/// artifact edits).
pub fn replay_status(events: &[ApprovalEvent]) -> Option<&'static str> {
    events
        .iter()
        .filter_map(|event| event.action_type.resulting_status())
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ActionType, ActorRef};

    fn event(action: ActionType) -> ApprovalEvent {
        ApprovalEvent::new("proj-1", action, ActorRef::new("u-1", "Ana", "approver"))
    }

    #[test]
    fn replay_reaches_the_last_status() {
        let events = vec![
            event(ActionType::Submitted),
            event(ActionType::ChangesRequested),
            event(ActionType::Submitted),
            event(ActionType::Approved),
        ];
        assert_eq!(replay_status(&events), Some("approved"));
    }

    #[test]
    fn status_free_events_are_transparent() {
        let events = vec![
            event(ActionType::Submitted),
            event(ActionType::ArtifactEdited),
        ];
        assert_eq!(replay_status(&events), Some("submitted"));
    }

    #[test]
    fn empty_history_has_no_status() {
        assert_eq!(replay_status(&[]), None);
        assert_eq!(replay_status(&[event(ActionType::ArtifactEdited)]), None);
    }
}
