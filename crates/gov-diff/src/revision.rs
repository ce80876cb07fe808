// revision.rs — The versioned-artifact snapshot model.
//
// A revision is a numbered snapshot of an artifact's content: an ordered
// list of sections, each identified by a stable section_key and carrying a
// free-form JSON object body. Section keys are the identity used to match
// sections between two revisions when diffing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DiffError;

/// One content section of an artifact revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Stable identity of the section across revisions.
    pub section_key: String,
    /// The section content as a JSON object.
    pub body: Map<String, Value>,
}

impl Section {
    pub fn new(section_key: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            section_key: section_key.into(),
            body,
        }
    }
}

/// A numbered snapshot of an artifact's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// What kind of artifact this is a snapshot of (e.g. "requirements").
    pub artifact_type: String,
    /// The revision number.
    pub revision: u32,
    /// Ordered content sections.
    pub sections: Vec<Section>,
}

impl Revision {
    pub fn new(artifact_type: impl Into<String>, revision: u32, sections: Vec<Section>) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            revision,
            sections,
        }
    }

    /// Reject revisions with duplicate section keys — section_key is the
    /// matching identity, so duplicates make a diff ambiguous.
    pub(crate) fn check_unique_keys(&self) -> Result<(), DiffError> {
        let mut seen = std::collections::BTreeSet::new();
        for section in &self.sections {
            if !seen.insert(section.section_key.as_str()) {
                return Err(DiffError::DuplicateSection {
                    section_key: section.section_key.clone(),
                });
            }
        }
        Ok(())
    }
}
