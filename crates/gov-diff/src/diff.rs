// diff.rs — Diff model and computation.
//
// Sections are matched by section_key. A head-only section becomes a
// single Add op with the empty path carrying the whole body; a base-only
// section becomes the mirror Remove; sections present on both sides are
// diffed value by value, recursing into nested objects so the ops carry
// the narrowest changed leaf. Leaves (including arrays) are compared by
// structural equality and replaced wholesale.
//
// The diff also records the head's section key order so apply can
// reconstruct head exactly even when sections were inserted mid-list or
// reordered.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DiffError;
use crate::revision::Revision;

/// Schema tag stamped on every diff, for forward compatibility of stored
/// audit payloads.
pub const SCHEMA_VERSION: &str = "v1";

/// One operation within a section. `add` carries no before-value and
/// `remove` no after-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DiffOp {
    Add { path: String, after: Value },
    Remove { path: String, before: Value },
    Replace {
        path: String,
        before: Value,
        after: Value,
    },
}

impl DiffOp {
    pub fn path(&self) -> &str {
        match self {
            DiffOp::Add { path, .. } => path,
            DiffOp::Remove { path, .. } => path,
            DiffOp::Replace { path, .. } => path,
        }
    }
}

/// All operations against one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDiff {
    pub section_key: String,
    pub ops: Vec<DiffOp>,
}

/// A structured diff between two revisions of the same artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionDiff {
    pub schema_version: String,
    pub artifact_type: String,
    pub base_revision: u32,
    pub head_revision: u32,
    /// The head's section keys in order — lets apply reconstruct the
    /// head's section list exactly, not just its contents.
    pub section_order: Vec<String>,
    /// Per-section changes; unchanged sections do not appear.
    pub sections: Vec<SectionDiff>,
}

impl RevisionDiff {
    /// True when base and head had identical content.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Compute the structured diff from `base` to `head`.
///
/// Pure: no side effects, deterministic output for a given input pair.
pub fn diff(base: &Revision, head: &Revision) -> Result<RevisionDiff, DiffError> {
    if base.artifact_type != head.artifact_type {
        return Err(DiffError::ArtifactTypeMismatch {
            expected: base.artifact_type.clone(),
            actual: head.artifact_type.clone(),
        });
    }
    base.check_unique_keys()?;
    head.check_unique_keys()?;

    let mut sections = Vec::new();

    // Base-order pass: removed and mutated sections.
    for base_section in &base.sections {
        match head
            .sections
            .iter()
            .find(|s| s.section_key == base_section.section_key)
        {
            None => sections.push(SectionDiff {
                section_key: base_section.section_key.clone(),
                ops: vec![DiffOp::Remove {
                    path: String::new(),
                    before: Value::Object(base_section.body.clone()),
                }],
            }),
            Some(head_section) => {
                let mut ops = Vec::new();
                diff_objects(String::new(), &base_section.body, &head_section.body, &mut ops);
                if !ops.is_empty() {
                    sections.push(SectionDiff {
                        section_key: base_section.section_key.clone(),
                        ops,
                    });
                }
            }
        }
    }

    // Head-order pass: added sections.
    for head_section in &head.sections {
        let known = base
            .sections
            .iter()
            .any(|s| s.section_key == head_section.section_key);
        if !known {
            sections.push(SectionDiff {
                section_key: head_section.section_key.clone(),
                ops: vec![DiffOp::Add {
                    path: String::new(),
                    after: Value::Object(head_section.body.clone()),
                }],
            });
        }
    }

    Ok(RevisionDiff {
        schema_version: SCHEMA_VERSION.to_string(),
        artifact_type: head.artifact_type.clone(),
        base_revision: base.revision,
        head_revision: head.revision,
        section_order: head
            .sections
            .iter()
            .map(|s| s.section_key.clone())
            .collect(),
        sections,
    })
}

/// Recursive object diff producing leaf operations.
fn diff_objects(
    prefix: String,
    base: &Map<String, Value>,
    head: &Map<String, Value>,
    ops: &mut Vec<DiffOp>,
) {
    for (key, base_value) in base {
        let path = join_path(&prefix, key);
        match head.get(key) {
            None => ops.push(DiffOp::Remove {
                path,
                before: base_value.clone(),
            }),
            Some(head_value) if head_value == base_value => {}
            Some(Value::Object(head_object)) => {
                if let Value::Object(base_object) = base_value {
                    diff_objects(path, base_object, head_object, ops);
                } else {
                    ops.push(DiffOp::Replace {
                        path,
                        before: base_value.clone(),
                        after: Value::Object(head_object.clone()),
                    });
                }
            }
            Some(head_value) => ops.push(DiffOp::Replace {
                path,
                before: base_value.clone(),
                after: head_value.clone(),
            }),
        }
    }
    for (key, head_value) in head {
        if !base.contains_key(key) {
            ops.push(DiffOp::Add {
                path: join_path(&prefix, key),
                after: head_value.clone(),
            });
        }
    }
}

/// Build a JSON-pointer style path segment: `/` separates segments and the
/// characters `~` and `/` inside a key are escaped as `~0` and `~1`.
pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    format!("{}/{}", prefix, escape_segment(key))
}

pub(crate) fn escape_segment(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

pub(crate) fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
