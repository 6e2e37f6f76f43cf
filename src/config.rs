//! Export configuration
//!
//! [`ExportOptions`] carries every caller-level switch of an export run,
//! including the `include_unpublished` flag, explicitly into the
//! serializer. It can be built in code or read from a JSON file, with
//! unspecified fields taking their defaults.

use crate::error::{Error, Result};
use crate::ids::DEFAULT_ID_PREFIX;
use crate::policy::NotePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for an export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Emit unpublished notes and agents (marked `audience="internal"`)
    pub include_unpublished: bool,
    /// Namespace prefix for element ids
    pub id_prefix: String,
    /// Indentation for XML output; `None` writes compact output
    pub indent: Option<usize>,
    /// Per-type rendering policy
    pub policy: NotePolicy,
    /// Additional translations merged over the English defaults
    pub translations: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_unpublished: false,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            indent: None,
            policy: NotePolicy::default(),
            translations: None,
        }
    }
}

impl ExportOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&text).map_err(|e| {
            Error::Config(format!("invalid options file '{}': {}", path.display(), e))
        })?;
        log::debug!("Loaded export options from '{}'", path.display());
        Ok(options)
    }

    /// Set whether unpublished content is exported
    pub fn with_include_unpublished(mut self, include: bool) -> Self {
        self.include_unpublished = include;
        self
    }

    /// Set the id prefix
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Set indentation
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    /// Set the rendering policy
    pub fn with_policy(mut self, policy: NotePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set a translations file
    pub fn with_translations(mut self, path: impl Into<PathBuf>) -> Self {
        self.translations = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert!(!options.include_unpublished);
        assert_eq!(options.id_prefix, "aspace_");
        assert_eq!(options.indent, None);
    }

    #[test]
    fn test_builder() {
        let options = ExportOptions::new()
            .with_include_unpublished(true)
            .with_id_prefix("pul_")
            .with_indent(Some(2));

        assert!(options.include_unpublished);
        assert_eq!(options.id_prefix, "pul_");
        assert_eq!(options.indent, Some(2));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "include_unpublished": true, "indent": 4 }}"#).unwrap();

        let options = ExportOptions::from_json_file(file.path()).unwrap();
        assert!(options.include_unpublished);
        assert_eq!(options.indent, Some(4));
        assert_eq!(options.id_prefix, "aspace_");
    }

    #[test]
    fn test_from_invalid_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "include_unpublished": "yes" }}"#).unwrap();

        let err = ExportOptions::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
