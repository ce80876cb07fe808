//! # gov-diff
//!
//! Structured before/after diffs between two revisions of a versioned
//! artifact. A revision is an ordered list of keyed sections; a diff is a
//! list of per-section operations (add/remove/replace) with JSON-pointer
//! style paths.
//!
//! The contract is the round-trip law: for any `base` and `head`,
//! `apply(&base, &diff(&base, &head)?)? == head` — including sections
//! added, removed, reordered, and mutated in place. Diff payloads are
//! consumed by audit events and rendered in UI timelines, so the model is
//! fully serde-serializable.

pub mod apply;
pub mod diff;
pub mod error;
pub mod revision;

pub use apply::apply;
pub use diff::{diff, DiffOp, RevisionDiff, SectionDiff, SCHEMA_VERSION};
pub use error::DiffError;
pub use revision::{Revision, Section};
