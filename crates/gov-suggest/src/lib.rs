//! # gov-suggest
//!
//! Lifecycle for AI-generated suggestions attached to governed artifacts,
//! and the escalation scanner that flags suggestions left undecided past a
//! staleness window.
//!
//! The load-bearing guarantee is propose-time idempotence: a suggestion
//! carrying a trigger key is created at most once per
//! `(project, trigger_key)` while proposed — re-proposing returns the
//! existing row instead of duplicating it. The scanner leans on that to
//! make re-runs (hourly, after crashes, concurrently) always safe.

pub mod error;
pub mod lifecycle;
pub mod scanner;
pub mod suggestion;

pub use error::SuggestError;
pub use lifecycle::{
    trigger_key_index, Outcome, SuggestionLifecycle, SUGGESTIONS_TABLE,
};
pub use scanner::{
    EscalationScanner, ScanOutcome, ESCALATION_CONFIDENCE, MAX_STALE_DAYS, MIN_STALE_DAYS,
    SLA_ESCALATION_TYPE,
};
pub use suggestion::{NewSuggestion, Suggestion, SuggestionPatch, SuggestionStatus};
