//! # gov-trigger
//!
//! Declarative automation rules over governed artifacts, and the matcher
//! that answers "which rules fire for this event?".
//!
//! Matching is the whole job: the matcher returns [`TriggerMatch`] records
//! describing what automation *would* do (intent, steps, severity,
//! whether it may auto-execute) and never executes anything itself.
//! Execution belongs to whatever agent runtime consumes the matches.

pub mod error;
pub mod matcher;
pub mod rule;

pub use error::TriggerError;
pub use matcher::{matching_rules, TriggerMatcher, TRIGGERS_TABLE};
pub use rule::{RuleScope, Severity, TriggerMatch, TriggerRule};
