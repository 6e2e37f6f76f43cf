//! Localized labels
//!
//! Container labels and note heads are looked up by key with a fallback to
//! the raw enumeration value. [`Translations`] ships the English labels for
//! the keys the serializer uses and can be extended from JSON files, either
//! flat (`{"a.b": "x"}`) or nested (`{"a": {"b": "x"}}`).

use crate::error::{Error, Result};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

/// Key prefix for instance type labels
pub const INSTANCE_TYPE_KEY: &str = "enumerations.instance_instance_type";

/// Key prefix for note type heads
pub const NOTE_TYPE_KEY: &str = "_note_types";

/// Localization lookup
pub trait Translate: Send + Sync {
    /// Look up `key`, returning `default` when there is no translation
    fn translate(&self, key: &str, default: &str) -> String;
}

/// In-memory translation table
#[derive(Debug, Clone, Default)]
pub struct Translations {
    entries: HashMap<String, String>,
}

const ENGLISH: &[(&str, &str)] = &[
    ("enumerations.instance_instance_type.audio", "Audio"),
    ("enumerations.instance_instance_type.books", "Books"),
    ("enumerations.instance_instance_type.computer_disks", "Computer Disks"),
    ("enumerations.instance_instance_type.digital_object", "Digital Object"),
    ("enumerations.instance_instance_type.graphic_materials", "Graphic Materials"),
    ("enumerations.instance_instance_type.maps", "Maps"),
    ("enumerations.instance_instance_type.microform", "Microform"),
    ("enumerations.instance_instance_type.mixed_materials", "Mixed Materials"),
    ("enumerations.instance_instance_type.moving_images", "Moving Images"),
    ("enumerations.instance_instance_type.realia", "Realia"),
    ("enumerations.instance_instance_type.text", "Text"),
    ("_note_types.abstract", "Abstract"),
    ("_note_types.accessrestrict", "Conditions Governing Access"),
    ("_note_types.accruals", "Accruals"),
    ("_note_types.acqinfo", "Immediate Source of Acquisition"),
    ("_note_types.altformavail", "Existence and Location of Copies"),
    ("_note_types.appraisal", "Appraisal"),
    ("_note_types.arrangement", "Arrangement"),
    ("_note_types.bibliography", "Bibliography"),
    ("_note_types.bioghist", "Biographical / Historical"),
    ("_note_types.custodhist", "Custodial History"),
    ("_note_types.dimensions", "Dimensions"),
    ("_note_types.fileplan", "File Plan"),
    ("_note_types.index", "Index"),
    ("_note_types.langmaterial", "Language of Materials"),
    ("_note_types.legalstatus", "Legal Status"),
    ("_note_types.materialspec", "Materials Specific Details"),
    ("_note_types.odd", "General"),
    ("_note_types.originalsloc", "Existence and Location of Originals"),
    ("_note_types.otherfindaid", "Other Finding Aids"),
    ("_note_types.physdesc", "Physical Description"),
    ("_note_types.physfacet", "Physical Facet"),
    ("_note_types.physloc", "Physical Location"),
    ("_note_types.phystech", "Physical Characteristics and Technical Requirements"),
    ("_note_types.prefercite", "Preferred Citation"),
    ("_note_types.processinfo", "Processing Information"),
    ("_note_types.relatedmaterial", "Related Materials"),
    ("_note_types.scopecontent", "Scope and Contents"),
    ("_note_types.separatedmaterial", "Separated Materials"),
    ("_note_types.userestrict", "Conditions Governing Use"),
];

impl Translations {
    /// Create an empty table; every lookup falls back to its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Table preloaded with English labels
    pub fn english() -> Self {
        let mut table = Self::new();
        for (key, value) in ENGLISH {
            table.insert(*key, *value);
        }
        table
    }

    /// Add or replace a translation
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Add a translation
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge entries from a JSON document
    pub fn merge_json(&mut self, json: &JsonValue) -> Result<()> {
        match json {
            JsonValue::Object(_) => {
                flatten_into(&mut self.entries, String::new(), json);
                Ok(())
            }
            _ => Err(Error::Config(
                "translations must be a JSON object".to_string(),
            )),
        }
    }

    /// Merge entries from a JSON file
    pub fn merge_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let json: JsonValue = serde_json::from_str(&text)?;
        self.merge_json(&json)?;
        log::debug!(
            "Loaded translations from '{}' ({} entries)",
            path.as_ref().display(),
            self.entries.len()
        );
        Ok(())
    }
}

fn flatten_into(entries: &mut HashMap<String, String>, prefix: String, value: &JsonValue) {
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(entries, path, child);
            }
        }
        JsonValue::String(s) => {
            entries.insert(prefix, s.clone());
        }
        JsonValue::Null => {}
        other => {
            entries.insert(prefix, other.to_string());
        }
    }
}

impl Translate for Translations {
    fn translate(&self, key: &str, default: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}
