// error.rs — Error types for diff computation and replay.

use thiserror::Error;

/// Errors from computing or applying a revision diff.
#[derive(Debug, Error)]
pub enum DiffError {
    /// Base and head (or base and diff) describe different artifact types.
    #[error("artifact type mismatch: expected '{expected}', got '{actual}'")]
    ArtifactTypeMismatch { expected: String, actual: String },

    /// The diff was computed against a different base revision.
    #[error("diff targets base revision {expected}, got revision {actual}")]
    RevisionMismatch { expected: u32, actual: u32 },

    /// A revision contains two sections with the same key.
    #[error("duplicate section key '{section_key}'")]
    DuplicateSection { section_key: String },

    /// An operation targets a section the base does not contain.
    #[error("unknown section '{section_key}'")]
    UnknownSection { section_key: String },

    /// A recorded before-value does not match the current value.
    #[error("conflict at '{section_key}{path}': recorded before-value does not match")]
    Conflict { section_key: String, path: String },

    /// An operation path does not resolve within the section body.
    #[error("bad path '{path}' in section '{section_key}'")]
    BadPath { section_key: String, path: String },
}

impl DiffError {
    /// Stable machine-readable kind string for structured error surfaces.
    pub fn kind(&self) -> &'static str {
        match self {
            DiffError::ArtifactTypeMismatch { .. } => "artifact_type_mismatch",
            DiffError::RevisionMismatch { .. } => "revision_mismatch",
            DiffError::DuplicateSection { .. } => "duplicate_section",
            DiffError::UnknownSection { .. } => "unknown_section",
            DiffError::Conflict { .. } => "conflict",
            DiffError::BadPath { .. } => "bad_path",
        }
    }
}
