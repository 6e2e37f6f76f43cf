//! # eadexport
//!
//! EAD (Encoded Archival Description) serialization for archival
//! description records.
//!
//! Given JSON-shaped records for a resource or archival object, this
//! library appends EAD elements to a parent element for:
//!
//! - physical containers of an instance (`<container>` with nested levels)
//! - notes of a record, split into DID-level and archdesc-level notes
//! - biographical notes of linked creator and source agents
//! - free-text content, rebuilt into `<p>` paragraphs where required
//!
//! ## Example
//!
//! ```rust,ignore
//! use eadexport::{DescriptionRecord, EadSerializer, ExportOptions, XmlElement};
//!
//! let record: DescriptionRecord = serde_json::from_str(&json)?;
//! let serializer = EadSerializer::new(ExportOptions::default());
//!
//! let mut archdesc = XmlElement::new("archdesc");
//! serializer.serialize_nondid_notes(&record, &mut archdesc);
//! println!("{}", archdesc.to_xml()?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod names;

// XML tree and fragment checks
pub mod documents;
pub mod xml;

// Input records and configuration
pub mod config;
pub mod i18n;
pub mod ids;
pub mod model;
pub mod policy;

// Serialization
pub mod mixed;
pub mod serializer;

// Re-exports for convenience
pub use config::ExportOptions;
pub use error::{Error, MissingFieldError, Result};
pub use i18n::{Translate, Translations};
pub use ids::{IdGenerator, IdPrefix, RandomHexIds, SequentialIds};
pub use mixed::{handle_linebreaks, sanitize_mixed_content};
pub use model::{
    Agent, DescriptionRecord, Instance, Note, NoteType, Subnote, SubContainer, TopContainer,
};
pub use policy::NotePolicy;
pub use serializer::EadSerializer;
pub use xml::{XmlElement, XmlNode, XmlWriter};

/// Version of the eadexport library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
