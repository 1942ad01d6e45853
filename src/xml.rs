//! Minimal namespace-aware element tree on top of `quick-xml`.
//!
//! The legacy catalog stores everything as small XML documents: RDF
//! vocabularies, product type metadata and per-file `.met` documents. None of
//! them are large, so they are parsed into an owned tree and queried with
//! `ElementTree`-style lookups instead of streaming.

use std::fs;

use camino::Utf8Path;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct XmlError(String);

impl XmlError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Element name used for lookups. A `None` namespace matches any namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name<'a> {
    pub namespace: Option<&'a str>,
    pub local: &'a str,
}

impl<'a> Name<'a> {
    pub const fn any(local: &'a str) -> Self {
        Self {
            namespace: None,
            local,
        }
    }

    pub const fn qualified(namespace: &'a str, local: &'a str) -> Self {
        Self {
            namespace: Some(namespace),
            local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    fn new(namespace: Option<String>, name: String, attributes: Vec<Attribute>) -> Self {
        Self {
            namespace,
            name,
            attributes,
            children: Vec::new(),
            text: None,
        }
    }

    /// Character data between the start tag and the first child element.
    /// Text following a child is not part of it.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is(&self, name: Name<'_>) -> bool {
        self.name == name.local
            && name
                .namespace
                .is_none_or(|ns| self.namespace.as_deref() == Some(ns))
    }

    pub fn attribute(&self, name: Name<'_>) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| {
                attr.name == name.local
                    && name
                        .namespace
                        .is_none_or(|ns| attr.namespace.as_deref() == Some(ns))
            })
            .map(|attr| attr.value.as_str())
    }

    pub fn child(&self, name: Name<'_>) -> Option<&Element> {
        self.children.iter().find(|child| child.is(name))
    }

    pub fn children_named<'s>(&'s self, name: Name<'s>) -> impl Iterator<Item = &'s Element> + 's {
        self.children.iter().filter(move |child| child.is(name))
    }

    /// Pre-order walk over every element below this one.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    pub fn find(&self, name: Name<'_>) -> Option<&Element> {
        self.descendants().find(|element| element.is(name))
    }

    pub fn find_all<'s>(&'s self, name: Name<'s>) -> impl Iterator<Item = &'s Element> + 's {
        self.descendants().filter(move |element| element.is(name))
    }

    fn push_text(&mut self, value: &str) {
        if !self.children.is_empty() {
            return;
        }
        match &mut self.text {
            Some(text) => text.push_str(value),
            None => self.text = Some(value.to_string()),
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Parses a document from disk. The bytes are decoded with the encoding named
/// in the XML declaration (UTF-8 when there is none).
pub fn parse_file(path: &Utf8Path) -> Result<Element, XmlError> {
    let content =
        fs::read(path.as_std_path()).map_err(|err| XmlError::new(format!("read {path}: {err}")))?;
    parse_document(NsReader::from_reader(content.as_slice()))
}

/// Parses a whole document and returns its root element.
pub fn parse_str(content: &str) -> Result<Element, XmlError> {
    parse_document(NsReader::from_str(content))
}

fn parse_document(mut reader: NsReader<&[u8]>) -> Result<Element, XmlError> {
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|err| XmlError::new(err.to_string()))?;
        let namespace = namespace_of(&resolved);
        match event {
            Event::Start(start) => {
                let element = open_element(&reader, namespace, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, namespace, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::new("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let value = text
                        .unescape()
                        .map_err(|err| XmlError::new(err.to_string()))?;
                    current.push_text(&value);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let value = data
                        .decode()
                        .map_err(|err| XmlError::new(err.to_string()))?;
                    current.push_text(&value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::new("unexpected end of document"));
    }
    root.ok_or_else(|| XmlError::new("document has no root element"))
}

fn namespace_of(resolved: &ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| XmlError::new(err.to_string()))?;
        // namespace declarations are resolved by the reader already
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| XmlError::new(err.to_string()))?;
        attributes.push(Attribute {
            namespace: namespace_of(&resolved),
            name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value: value.into_owned(),
        });
    }
    Ok(Element::new(namespace, name, attributes))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::new("multiple root elements")),
    }
}
