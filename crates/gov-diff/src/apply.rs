// apply.rs — Replay a RevisionDiff onto a base revision.
//
// Remove and Replace verify the recorded before-value against the current
// value, so applying a diff to the wrong base surfaces as Conflict rather
// than silently producing a bogus head. The section list is rebuilt from
// the diff's section_order, which is what makes the round-trip law hold
// for inserted and reordered sections.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::diff::{unescape_segment, DiffOp, RevisionDiff, SectionDiff};
use crate::error::DiffError;
use crate::revision::{Revision, Section};

/// Apply `diff` to `base`, producing the head revision it was computed
/// against. Law: `apply(&base, &diff(&base, &head)?)? == head`.
pub fn apply(base: &Revision, diff: &RevisionDiff) -> Result<Revision, DiffError> {
    if base.artifact_type != diff.artifact_type {
        return Err(DiffError::ArtifactTypeMismatch {
            expected: diff.artifact_type.clone(),
            actual: base.artifact_type.clone(),
        });
    }
    if base.revision != diff.base_revision {
        return Err(DiffError::RevisionMismatch {
            expected: diff.base_revision,
            actual: base.revision,
        });
    }
    base.check_unique_keys()?;

    let mut bodies: BTreeMap<String, Map<String, Value>> = base
        .sections
        .iter()
        .map(|s| (s.section_key.clone(), s.body.clone()))
        .collect();

    for section_diff in &diff.sections {
        apply_section(&mut bodies, section_diff)?;
    }

    // Rebuild the section list in the head's recorded order.
    let mut sections = Vec::with_capacity(diff.section_order.len());
    for key in &diff.section_order {
        let body = bodies.remove(key).ok_or_else(|| DiffError::UnknownSection {
            section_key: key.clone(),
        })?;
        sections.push(Section::new(key.clone(), body));
    }
    // Anything left over was neither removed nor listed in the head order,
    // which means the diff is internally inconsistent.
    if let Some(key) = bodies.into_keys().next() {
        return Err(DiffError::UnknownSection { section_key: key });
    }

    Ok(Revision::new(
        diff.artifact_type.clone(),
        diff.head_revision,
        sections,
    ))
}

fn apply_section(
    bodies: &mut BTreeMap<String, Map<String, Value>>,
    section_diff: &SectionDiff,
) -> Result<(), DiffError> {
    let key = &section_diff.section_key;

    // Section-level add/remove: a single op with the empty path.
    if let [op] = section_diff.ops.as_slice() {
        if op.path().is_empty() {
            return apply_section_level(bodies, key, op);
        }
    }

    let body = bodies.get_mut(key).ok_or_else(|| DiffError::UnknownSection {
        section_key: key.clone(),
    })?;
    for op in &section_diff.ops {
        if op.path().is_empty() {
            // Empty paths are only valid as a lone section-level op.
            return Err(DiffError::BadPath {
                section_key: key.clone(),
                path: String::new(),
            });
        }
        apply_op(body, op, key)?;
    }
    Ok(())
}

fn apply_section_level(
    bodies: &mut BTreeMap<String, Map<String, Value>>,
    key: &str,
    op: &DiffOp,
) -> Result<(), DiffError> {
    match op {
        DiffOp::Add { after, .. } => {
            let Value::Object(body) = after else {
                return Err(DiffError::BadPath {
                    section_key: key.to_string(),
                    path: String::new(),
                });
            };
            if bodies.insert(key.to_string(), body.clone()).is_some() {
                return Err(DiffError::Conflict {
                    section_key: key.to_string(),
                    path: String::new(),
                });
            }
            Ok(())
        }
        DiffOp::Remove { before, .. } => {
            let current = bodies.remove(key).ok_or_else(|| DiffError::UnknownSection {
                section_key: key.to_string(),
            })?;
            if &Value::Object(current) != before {
                return Err(DiffError::Conflict {
                    section_key: key.to_string(),
                    path: String::new(),
                });
            }
            Ok(())
        }
        DiffOp::Replace { .. } => Err(DiffError::BadPath {
            section_key: key.to_string(),
            path: String::new(),
        }),
    }
}

fn apply_op(body: &mut Map<String, Value>, op: &DiffOp, section_key: &str) -> Result<(), DiffError> {
    let (parent, leaf) = resolve_parent(body, op.path(), section_key)?;
    match op {
        DiffOp::Add { after, .. } => {
            if parent.contains_key(&leaf) {
                return Err(DiffError::Conflict {
                    section_key: section_key.to_string(),
                    path: op.path().to_string(),
                });
            }
            parent.insert(leaf, after.clone());
        }
        DiffOp::Remove { before, .. } => {
            match parent.get(&leaf) {
                Some(current) if current == before => {
                    parent.remove(&leaf);
                }
                Some(_) => {
                    return Err(DiffError::Conflict {
                        section_key: section_key.to_string(),
                        path: op.path().to_string(),
                    })
                }
                None => {
                    return Err(DiffError::BadPath {
                        section_key: section_key.to_string(),
                        path: op.path().to_string(),
                    })
                }
            }
        }
        DiffOp::Replace { before, after, .. } => {
            match parent.get(&leaf) {
                Some(current) if current == before => {
                    parent.insert(leaf, after.clone());
                }
                Some(_) => {
                    return Err(DiffError::Conflict {
                        section_key: section_key.to_string(),
                        path: op.path().to_string(),
                    })
                }
                None => {
                    return Err(DiffError::BadPath {
                        section_key: section_key.to_string(),
                        path: op.path().to_string(),
                    })
                }
            }
        }
    }
    Ok(())
}

/// Walk a `/a/b/c` path to the object holding the final segment, returning
/// that parent and the unescaped leaf key.
fn resolve_parent<'a>(
    body: &'a mut Map<String, Value>,
    path: &str,
    section_key: &str,
) -> Result<(&'a mut Map<String, Value>, String), DiffError> {
    let bad_path = || DiffError::BadPath {
        section_key: section_key.to_string(),
        path: path.to_string(),
    };

    let mut segments: Vec<String> = path
        .strip_prefix('/')
        .ok_or_else(bad_path)?
        .split('/')
        .map(unescape_segment)
        .collect();
    let leaf = segments.pop().ok_or_else(bad_path)?;

    let mut parent = body;
    for segment in segments {
        match parent.get_mut(&segment) {
            Some(Value::Object(inner)) => parent = inner,
            _ => return Err(bad_path()),
        }
    }
    Ok((parent, leaf))
}
