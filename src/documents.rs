//! XML fragment parsing and well-formedness checking
//!
//! Paragraph reconstruction and mixed-content sanitation both need to know
//! whether a piece of markup can be embedded verbatim. The checks here wrap
//! the fragment in a synthetic root and stream it through the quick-xml
//! reader, additionally enforcing what the tokenizer itself lets through
//! (unclosed elements, invalid names, undefined entities).

use crate::error::{Error, Result};
use crate::names::is_valid_name;
use crate::xml::{XmlElement, XmlNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

const FRAGMENT_ROOT: &str = "eadexport-fragment";

/// A well-formedness problem in an XML fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSyntaxError {
    /// Error message
    pub message: String,
    /// Byte offset into the fragment
    pub position: usize,
}

impl XmlSyntaxError {
    fn new(message: impl Into<String>, wrapped_position: usize) -> Self {
        Self {
            message: message.into(),
            position: wrapped_position.saturating_sub(FRAGMENT_ROOT.len() + 2),
        }
    }
}

impl fmt::Display for XmlSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for XmlSyntaxError {}

/// Collect well-formedness errors of a mixed-content fragment
///
/// The fragment may contain any number of top-level elements interleaved
/// with text. An empty result means the fragment can be embedded as is.
pub fn well_formedness_errors(fragment: &str) -> Vec<XmlSyntaxError> {
    let wrapped = format!("<{root}>{fragment}</{root}>", root = FRAGMENT_ROOT);
    let mut reader = Reader::from_reader(wrapped.as_bytes());

    let mut errors = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = check_start(&e, position, &mut errors);
                open.push(name);
            }
            Ok(Event::Empty(e)) => {
                check_start(&e, position, &mut errors);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match open.pop() {
                    Some(expected) if expected == name => {
                        if open.is_empty() && reader.buffer_position() < wrapped.len() {
                            errors.push(XmlSyntaxError::new(
                                format!("Unexpected closing tag '</{}>'", name),
                                position,
                            ));
                            break;
                        }
                    }
                    Some(expected) => {
                        errors.push(XmlSyntaxError::new(
                            format!("Expected '</{}>', found '</{}>'", expected, name),
                            position,
                        ));
                        break;
                    }
                    None => {
                        errors.push(XmlSyntaxError::new(
                            format!("Unexpected closing tag '</{}>'", name),
                            position,
                        ));
                        break;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Err(err) = e.unescape() {
                    errors.push(XmlSyntaxError::new(err.to_string(), position));
                }
            }
            Ok(Event::DocType(_)) | Ok(Event::Decl(_)) => {
                errors.push(XmlSyntaxError::new(
                    "Declarations are not allowed in a fragment",
                    position,
                ));
            }
            Ok(Event::Eof) => {
                for name in open.iter().rev() {
                    errors.push(XmlSyntaxError::new(
                        format!("Element '{}' is not closed", name),
                        position,
                    ));
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                errors.push(XmlSyntaxError::new(e.to_string(), reader.buffer_position()));
                break;
            }
        }
        buf.clear();
    }

    errors
}

/// Check if a fragment is well-formed
pub fn is_well_formed(fragment: &str) -> bool {
    well_formedness_errors(fragment).is_empty()
}

fn check_start(start: &BytesStart, position: usize, errors: &mut Vec<XmlSyntaxError>) -> String {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    if !is_valid_name(&name) {
        errors.push(XmlSyntaxError::new(
            format!("Invalid element name '{}'", name),
            position,
        ));
    }

    for attr_result in start.attributes() {
        match attr_result {
            Ok(attr) => {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                if !is_valid_name(&key) {
                    errors.push(XmlSyntaxError::new(
                        format!("Invalid attribute name '{}'", key),
                        position,
                    ));
                }
                if let Err(err) = attr.unescape_value() {
                    errors.push(XmlSyntaxError::new(err.to_string(), position));
                }
            }
            Err(err) => {
                errors.push(XmlSyntaxError::new(err.to_string(), position));
                break;
            }
        }
    }

    name
}

/// Parsed XML document
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<XmlElement>,
}

impl Document {
    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes
    ///
    /// Text is kept exactly as written (no trimming), interleaved with
    /// child elements in document order.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);

        let mut doc = Document::default();
        let mut element_stack: Vec<XmlElement> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    element_stack.push(Self::parse_element(&e)?);
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.push_element(current);
                        } else {
                            doc.root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let element = Self::parse_element(&e)?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.push_element(element);
                    } else {
                        doc.root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?
                            .into_owned();
                        match current.children.last_mut() {
                            Some(XmlNode::Text(previous)) => previous.push_str(&text),
                            _ => current.push_text(text),
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(doc)
    }

    /// Parse a fragment; the sibling nodes become children of a synthetic root
    pub fn from_fragment(fragment: &str) -> Result<XmlElement> {
        let wrapped = format!("<{root}>{fragment}</{root}>", root = FRAGMENT_ROOT);
        Self::from_string(&wrapped)?
            .root
            .ok_or_else(|| Error::Xml("Fragment produced no root element".to_string()))
    }

    fn parse_element(start: &BytesStart) -> Result<XmlElement> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut element = XmlElement::new(name);

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .into_owned();

            element.set_attribute(attr_name, attr_value);
        }

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&XmlElement> {
        self.root.as_ref()
    }
}
