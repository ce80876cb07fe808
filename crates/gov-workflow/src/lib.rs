//! # gov-workflow
//!
//! Role-gated state machine for change requests.
//!
//! A change request moves draft → submitted → {approved, changes_requested,
//! rejected}, with changes_requested allowing resubmission or a pull back
//! to draft. Approved and rejected are terminal: later edits spawn new
//! change requests rather than reopening a settled one.
//!
//! Every successful transition commits exactly one unit of work pairing
//! the status update with its audit event — both land or neither does.
//! Role authority is an injected lookup table ([`RolePolicy`]), never a
//! process-wide singleton.

pub mod change;
pub mod error;
pub mod machine;
pub mod role;

pub use change::{ChangeRequest, ChangeStatus, ImpactAnalysis, Priority, RiskLevel};
pub use error::WorkflowError;
pub use machine::{ChangeStateMachine, TransitionPlan, CHANGES_TABLE};
pub use role::{Actor, Role, RolePolicy};
