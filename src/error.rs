//! Error types for eadexport
//!
//! This module defines all error types used throughout the library.
//! Most transformation problems degrade silently (an attribute is omitted,
//! a reconstruction falls back to the input); only violations of the input
//! contract and I/O failures surface as errors.

use std::fmt;
use thiserror::Error;

/// Result type alias using eadexport Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for eadexport operations
#[derive(Error, Debug)]
pub enum Error {
    /// A field the serializer cannot work without is absent
    #[error("missing required field: {0}")]
    MissingField(#[from] MissingFieldError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML writing or parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

/// A mandatory field was absent from an input record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFieldError {
    /// Dotted path of the missing field, e.g. `sub_container.top_container`
    pub field: String,
    /// Kind of record the field belongs to
    pub record: Option<String>,
}

impl MissingFieldError {
    /// Create a new missing field error
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            record: None,
        }
    }

    /// Set the record kind
    pub fn in_record(mut self, record: impl Into<String>) -> Self {
        self.record = Some(record.into());
        self
    }
}

impl fmt::Display for MissingFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.field)?;

        if let Some(ref record) = self.record {
            write!(f, " (in {})", record)?;
        }

        Ok(())
    }
}

impl std::error::Error for MissingFieldError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = MissingFieldError::new("sub_container.top_container._resolved")
            .in_record("instance");

        let msg = format!("{}", err);
        assert!(msg.contains("sub_container.top_container._resolved"));
        assert!(msg.contains("(in instance)"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = MissingFieldError::new("sub_container").into();
        assert!(matches!(err, Error::MissingField(_)));
        assert_eq!(
            err.to_string(),
            "missing required field: 'sub_container'"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
