//! XML element tree and writer
//!
//! Serializer operations append to an [`XmlElement`] tree; [`XmlWriter`]
//! turns the tree into text with quick-xml. Attributes keep insertion order.
//!
//! Markup that has already been checked for well-formedness (reconstructed
//! paragraphs, inline EAD markup from note content) is carried as
//! [`XmlNode::Raw`] and written verbatim.

use crate::error::Result;
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Ordered attribute mapping
pub type Attributes = IndexMap<String, String>;

/// Node in the element tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Character data, escaped on output
    Text(String),
    /// Well-formed markup, written as is
    Raw(String),
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        XmlNode::Element(element)
    }
}

/// XML element with ordered attributes and mixed content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Element name
    pub name: String,
    /// Element attributes in insertion order
    pub attributes: Attributes,
    /// Child nodes
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create a new element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Add a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push_element(child);
        self
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Append a child element
    pub fn push_element(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Append character data
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Append pre-checked markup
    pub fn push_raw(&mut self, markup: impl Into<String>) {
        self.children.push(XmlNode::Raw(markup.into()));
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Find child elements by name
    pub fn find_children(&self, name: &str) -> Vec<&XmlElement> {
        self.elements().filter(|e| e.name == name).collect()
    }

    /// Check if the element has children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Serialize with the default writer
    pub fn to_xml(&self) -> Result<String> {
        XmlWriter::new().write_element(self)
    }
}

/// Serializes element trees to strings
#[derive(Debug, Clone, Default)]
pub struct XmlWriter {
    indent: Option<usize>,
}

impl XmlWriter {
    /// Create a writer producing compact output
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent nested elements by `indent` spaces
    ///
    /// Indentation inserts whitespace between elements, which is only
    /// harmless for element-only content; leave it off for exact output.
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    /// Write a single element
    pub fn write_element(&self, element: &XmlElement) -> Result<String> {
        let mut writer = self.writer();
        write_element_into(&mut writer, element)?;
        finish(writer)
    }

    /// Write a sequence of sibling nodes
    pub fn write_nodes(&self, nodes: &[XmlNode]) -> Result<String> {
        let mut writer = self.writer();
        for node in nodes {
            write_node(&mut writer, node)?;
        }
        finish(writer)
    }

    fn writer(&self) -> Writer<Vec<u8>> {
        match self.indent {
            Some(n) if n > 0 => Writer::new_with_indent(Vec::new(), b' ', n),
            _ => Writer::new(Vec::new()),
        }
    }
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner())
        .map_err(|e| crate::Error::Xml(format!("Writer produced invalid UTF-8: {}", e)))
}

fn write_element_into(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    }
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(element) => write_element_into(writer, element)?,
        XmlNode::Text(text) => {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        XmlNode::Raw(markup) => {
            writer.write_event(Event::Text(BytesText::from_escaped(markup.as_str())))?;
        }
    }
    Ok(())
}
