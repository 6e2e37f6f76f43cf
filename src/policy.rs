//! Per-type note rendering policy
//!
//! Static tables deciding, per note type, whether content is wrapped in
//! `<p>` paragraphs, whether a `<head>` is emitted, and which dispatch path
//! (DID or archdesc) exports it.

use crate::model::{NoteType, NoteTypeSet};
use serde::{Deserialize, Serialize};

const PARAGRAPH_TYPES: &[&str] = &[
    "accessrestrict",
    "accruals",
    "acqinfo",
    "altformavail",
    "appraisal",
    "arrangement",
    "bibliography",
    "bioghist",
    "custodhist",
    "fileplan",
    "index",
    "legalstatus",
    "odd",
    "originalsloc",
    "otherfindaid",
    "phystech",
    "prefercite",
    "processinfo",
    "relatedmaterial",
    "scopecontent",
    "separatedmaterial",
    "userestrict",
];

const DID_TYPES: &[&str] = &[
    "abstract",
    "dimensions",
    "langmaterial",
    "materialspec",
    "physdesc",
    "physfacet",
    "physloc",
];

fn type_set(names: &[&str]) -> NoteTypeSet {
    names.iter().map(|n| NoteType::from(*n)).collect()
}

/// Rendering policy tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotePolicy {
    /// Types whose content is wrapped in paragraphs
    pub paragraph_types: NoteTypeSet,
    /// Types rendered without a `<head>`
    pub headless_types: NoteTypeSet,
    /// Types exported by the DID path unless the record overrides them
    pub did_note_types: NoteTypeSet,
    /// Types exported by the non-DID path unless the record overrides them
    pub archdesc_note_types: NoteTypeSet,
}

impl Default for NotePolicy {
    fn default() -> Self {
        Self {
            paragraph_types: type_set(PARAGRAPH_TYPES),
            headless_types: type_set(DID_TYPES),
            did_note_types: type_set(DID_TYPES),
            archdesc_note_types: type_set(PARAGRAPH_TYPES),
        }
    }
}

impl NotePolicy {
    /// Create the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether content of this type is wrapped in `<p>` elements
    pub fn include_paragraph(&self, note_type: &NoteType) -> bool {
        self.paragraph_types.contains(note_type)
    }

    /// Whether the `<head>` is left out for this note
    ///
    /// Content that already starts with its own `<head>` is headless too.
    pub fn is_headless(&self, note_type: &NoteType, content: Option<&str>) -> bool {
        self.headless_types.contains(note_type)
            || content.map_or(false, |c| c.trim_start().starts_with("<head"))
    }

    /// Add a paragraph-wrapped type
    pub fn with_paragraph_type(mut self, note_type: NoteType) -> Self {
        self.paragraph_types.insert(note_type);
        self
    }

    /// Add a headless type
    pub fn with_headless_type(mut self, note_type: NoteType) -> Self {
        self.headless_types.insert(note_type);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paragraph_policy() {
        let policy = NotePolicy::default();
        assert!(policy.include_paragraph(&NoteType::Bioghist));
        assert!(policy.include_paragraph(&NoteType::Legalstatus));
        assert!(!policy.include_paragraph(&NoteType::Dimensions));
        assert!(!policy.include_paragraph(&NoteType::Other("custom".to_string())));
    }

    #[test]
    fn test_headless_policy() {
        let policy = NotePolicy::default();
        assert!(policy.is_headless(&NoteType::Abstract, None));
        assert!(!policy.is_headless(&NoteType::Scopecontent, Some("text")));
        assert!(policy.is_headless(&NoteType::Scopecontent, Some("  <head>Own</head>text")));
    }

    #[test]
    fn test_partial_policy_from_json() {
        let policy: NotePolicy =
            serde_json::from_str(r#"{ "headless_types": ["odd"] }"#).unwrap();
        assert!(policy.is_headless(&NoteType::Odd, None));
        assert!(!policy.is_headless(&NoteType::Abstract, None));
        assert!(policy.include_paragraph(&NoteType::Scopecontent));
    }

    #[test]
    fn test_type_sets_are_disjoint() {
        let policy = NotePolicy::default();
        assert!(policy
            .did_note_types
            .is_disjoint(&policy.archdesc_note_types));
    }
}
