//! Event-level view of one XML part.
//!
//! The part is kept as the exact event stream quick-xml produced, so writing it
//! back reproduces the original markup. Only the character data of `t`
//! elements in the WordprocessingML namespace is exposed as text nodes (any
//! prefix, or the default namespace), and only nodes whose text was replaced
//! are re-serialized.

use std::borrow::Cow;

use quick_xml::events::{BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};

use super::{ContentTree, TextNode};
use crate::error::{Error, Result};

const TEXT_LOCAL_NAME: &[u8] = b"t";

/// Transitional and Strict WordprocessingML namespaces.
const WORD_NAMESPACES: [&[u8]; 2] = [
    b"http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    b"http://purl.oclc.org/ooxml/wordprocessingml/main",
];

fn is_text_element(ns: &ResolveResult, local_name: &[u8]) -> bool {
    local_name == TEXT_LOCAL_NAME
        && match ns {
            ResolveResult::Bound(uri) => WORD_NAMESPACES.iter().any(|known| *known == uri.as_ref()),
            _ => false,
        }
}

/// Character data of a single `w:t` element.
#[derive(Debug, Clone)]
pub struct XmlTextNode {
    event_index: usize,
    text: String,
    modified: bool,
}

impl TextNode for XmlTextNode {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, value: String) {
        self.text = value;
        self.modified = true;
    }
}

/// A parsed XML part of a package.
#[derive(Debug, Clone)]
pub struct XmlPart {
    name: String,
    events: Vec<Event<'static>>,
    nodes: Vec<XmlTextNode>,
}

impl XmlPart {
    /// Parse `bytes` as the part `name` of the package at `source`.
    pub fn parse(source: &str, name: &str, bytes: &[u8]) -> Result<Self> {
        let invalid = |e: quick_xml::Error| Error::document_invalid_xml(source, name, e.to_string());

        let mut reader = NsReader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut events = Vec::new();
        let mut nodes = Vec::new();
        let mut in_text = false;

        loop {
            let (ns, event) = reader.read_resolved_event_into(&mut buf).map_err(invalid)?;
            match &event {
                Event::Eof => break,
                Event::Start(tag) if is_text_element(&ns, tag.local_name().as_ref()) => {
                    in_text = true
                }
                Event::End(tag) if is_text_element(&ns, tag.local_name().as_ref()) => {
                    in_text = false
                }
                Event::Text(text) if in_text => {
                    nodes.push(XmlTextNode {
                        event_index: events.len(),
                        text: text.unescape().map_err(invalid)?.into_owned(),
                        modified: false,
                    });
                }
                _ => {}
            }
            events.push(event.into_owned());
            buf.clear();
        }

        Ok(XmlPart {
            name: name.to_string(),
            events,
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text_nodes(&self) -> &[XmlTextNode] {
        &self.nodes
    }

    /// Concatenated text of all nodes, in document order.
    pub fn text(&self) -> String {
        self.nodes.iter().map(|n| n.text.as_str()).collect()
    }

    pub fn is_modified(&self) -> bool {
        self.nodes.iter().any(|n| n.modified)
    }

    /// Serialize the part, substituting replaced text nodes.
    pub fn to_bytes(&self, source: &str) -> Result<Vec<u8>> {
        let failed = |e: &dyn std::fmt::Display| {
            Error::document_invalid_xml(source, &self.name, e.to_string())
        };

        let mut writer = Writer::new(Vec::new());
        let mut pending = self.nodes.iter().filter(|n| n.modified).peekable();

        for (idx, event) in self.events.iter().enumerate() {
            let event: Cow<'_, Event<'_>> = match pending.peek() {
                Some(node) if node.event_index == idx => {
                    let text = pending.next().map(|n| n.text.as_str()).unwrap_or_default();
                    Cow::Owned(Event::Text(BytesText::new(text)))
                }
                _ => Cow::Borrowed(event),
            };

            writer.write_event(event).map_err(|e| failed(&e))?;
        }

        Ok(writer.into_inner())
    }

    pub(crate) fn mark_saved(&mut self) {
        for node in &mut self.nodes {
            node.modified = false;
        }
    }
}

impl ContentTree for XmlPart {
    fn visit_text_nodes(&mut self, visit: &mut dyn FnMut(&mut dyn TextNode)) {
        for node in &mut self.nodes {
            visit(node);
        }
    }
}
