//! # gov-audit
//!
//! Append-only, replayable audit trail for governance actions.
//!
//! Every state transition, suggestion decision, and artifact edit in the
//! system is recorded as an [`ApprovalEvent`]. Append is the only write
//! path — no update or delete exists in the public contract, and the
//! engine never rewrites history. Reading back a subject's events in
//! chronological order reconstructs its current status ([`replay_status`]).
//!
//! ## Quick Example
//!
//! ```rust
//! use gov_audit::{ActionType, ActorRef, ApprovalEvent, AuditLog};
//! use gov_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let log = AuditLog::new(&store);
//! let actor = ActorRef::new("u-17", "Ana", "approver");
//! let event = ApprovalEvent::new("proj-1", ActionType::Submitted, actor);
//! log.append(&event).unwrap();
//! ```

pub mod error;
pub mod event;
pub mod hasher;
pub mod log;
pub mod replay;

pub use error::AuditError;
pub use event::{ActionType, ActorRef, ApprovalEvent, EventMeta};
pub use log::{AuditLog, TimelineSubject, EVENTS_TABLE, MAX_TIMELINE_LIMIT, MIN_TIMELINE_LIMIT};
pub use replay::replay_status;
