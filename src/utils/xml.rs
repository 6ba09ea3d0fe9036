//! Minimal owned XML element tree with path navigation.
//!
//! Built on `quick_xml::Reader`. Names are stored by local name, so
//! `<arxiv:doi>` is addressed as `doi`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors from parsing or navigating an XML document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// The input is not well-formed XML
    #[error("XML parse error: {0}")]
    Parse(String),

    /// No element exists along the requested path
    #[error("tag not found: {0}")]
    TagNotFound(String),
}

/// A single XML element with its attributes, text and children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::Parse(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError::Parse(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    /// Value of an attribute, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text content directly inside this element
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// This element and all its descendants with the given name, in document order
    pub fn descendants_named<'a>(&'a self, name: &'a str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            child.collect_named(name, found);
        }
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Parse a complete document from text
    pub fn parse(input: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        // Open elements; the bottom entry is a synthetic holder for the root
        let mut stack: Vec<XmlElement> = vec![XmlElement::default()];

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(XmlElement::from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = XmlElement::from_start(e)?;
                    attach(&mut stack, element);
                }
                Ok(Event::End(_)) => {
                    if stack.len() < 2 {
                        return Err(XmlError::Parse("unbalanced closing tag".to_string()));
                    }
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, element);
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|e| XmlError::Parse(e.to_string()))?;
                    push_text(&mut stack, &text);
                }
                Ok(Event::CData(ref e)) => {
                    push_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(XmlError::Parse(format!(
                        "at position {}: {}",
                        reader.error_position(),
                        e
                    )))
                }
            }
        }

        if stack.len() != 1 {
            return Err(XmlError::Parse("unexpected end of document".to_string()));
        }

        stack
            .pop()
            .and_then(|holder| holder.children.into_iter().next())
            .map(|root| Self { root })
            .ok_or_else(|| XmlError::Parse("document has no root element".to_string()))
    }

    /// The root element
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Follow a path of element names from the root, taking the first match at
    /// each step. The first name must match the root element itself.
    pub fn find_path(&self, path: &[&str]) -> Result<&XmlElement, XmlError> {
        let not_found = || XmlError::TagNotFound(path.join("/"));

        let (first, rest) = path.split_first().ok_or_else(not_found)?;
        if self.root.name != *first {
            return Err(not_found());
        }

        rest.iter()
            .try_fold(&self.root, |element, name| element.child(name))
            .ok_or_else(not_found)
    }

    /// The last non-empty value of `attr` on any element named `element`,
    /// anywhere in the document.
    pub fn find_last_attr(&self, element: &str, attr: &str) -> Result<String, XmlError> {
        self.root
            .descendants_named(element)
            .into_iter()
            .filter_map(|e| e.attr(attr))
            .filter(|v| !v.trim().is_empty())
            .last()
            .map(|v| v.trim().to_string())
            .ok_or_else(|| XmlError::TagNotFound(format!("{}[@{}]", element, attr)))
    }
}

fn attach(stack: &mut [XmlElement], element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        if !current.text.is_empty() {
            current.text.push(' ');
        }
        current.text.push_str(text);
    }
}
