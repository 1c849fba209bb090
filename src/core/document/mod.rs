//! Document model and in-place text mutation.
//!
//! The batch pipeline only sees the traits in this module: a document exposes a
//! main content tree plus header and footer trees, and every tree yields its
//! text nodes for reading and overwriting. `package` implements them for Word
//! packages on disk.
//!
//! Substitution is node-local. A token split across two adjacent text nodes
//! (e.g. `3` and `月` in separate runs) is not matched.

mod package;
mod xml;

pub use package::{WordOpener, WordPackage};
pub use xml::{XmlPart, XmlTextNode};

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::substitution::SubstitutionSpec;

/// A node holding literal character content.
pub trait TextNode {
    fn text(&self) -> &str;
    fn set_text(&mut self, value: String);
}

/// A tree of content whose text nodes can be visited in document order.
pub trait ContentTree {
    fn visit_text_nodes(&mut self, visit: &mut dyn FnMut(&mut dyn TextNode));
}

/// An open, writable document.
pub trait Document {
    fn main_content(&mut self) -> &mut dyn ContentTree;
    fn header_parts(&mut self) -> Vec<&mut dyn ContentTree>;
    fn footer_parts(&mut self) -> Vec<&mut dyn ContentTree>;

    /// Persist pending text changes. Returns whether anything was written.
    fn save(&mut self) -> Result<bool>;
}

/// Opens documents for writing.
pub trait DocumentOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Document>>;
}

/// Outcome of mutating one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    pub content_changed: bool,
    pub nodes_changed: usize,
}

/// Apply `spec` to every text node of the body, all headers and all footers.
pub fn mutate_document(doc: &mut dyn Document, spec: &SubstitutionSpec) -> MutationResult {
    let mut nodes_changed = mutate_tree(doc.main_content(), spec);

    for header in doc.header_parts() {
        nodes_changed += mutate_tree(header, spec);
    }
    for footer in doc.footer_parts() {
        nodes_changed += mutate_tree(footer, spec);
    }

    MutationResult {
        content_changed: nodes_changed > 0,
        nodes_changed,
    }
}

fn mutate_tree(tree: &mut dyn ContentTree, spec: &SubstitutionSpec) -> usize {
    let mut changed = 0;
    tree.visit_text_nodes(&mut |node: &mut dyn TextNode| {
        if let Some(updated) = spec.apply(node.text()) {
            node.set_text(updated);
            changed += 1;
        }
    });
    changed
}
