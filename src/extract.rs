//! Collection of `error`/`warning` elements and their removal from the tree.

use serde::Serialize;

use crate::parser::{Document, Element, Node};

pub const ERROR_TAG: &str = "error";
pub const WARNING_TAG: &str = "warning";

/// A record that is read off every element carrying a given tag name
pub trait Record: Sized {
    const TAG: &'static str;

    fn from_element(element: &Element) -> Self;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub code: String,
    pub text: String,
}

impl Record for ErrorRecord {
    const TAG: &'static str = ERROR_TAG;

    fn from_element(element: &Element) -> Self {
        Self {
            code: element.attribute("code").unwrap_or_default().to_string(),
            text: element.attribute("text").unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningRecord {
    pub text: String,
}

impl Record for WarningRecord {
    const TAG: &'static str = WARNING_TAG;

    fn from_element(element: &Element) -> Self {
        Self {
            text: element.attribute("text").unwrap_or_default().to_string(),
        }
    }
}

/// Read every `R::TAG` element, last one in document order first.
pub fn extract<R: Record>(document: &Document) -> Vec<R> {
    document
        .elements_named(R::TAG)
        .into_iter()
        .rev()
        .map(R::from_element)
        .collect()
}

pub fn extract_errors(document: &Document) -> Vec<ErrorRecord> {
    extract(document)
}

pub fn extract_warnings(document: &Document) -> Vec<WarningRecord> {
    extract(document)
}

/// Copy of `document` with every element named in `tags` removed,
/// together with its subtree.
pub fn strip_tags(document: &Document, tags: &[&str]) -> Document {
    Document::new(strip_nodes(&document.children, tags))
}

fn strip_nodes(nodes: &[Node], tags: &[&str]) -> Vec<Node> {
    nodes
        .iter()
        .filter_map(|node| match node {
            Node::Element(element) if tags.contains(&element.name.as_str()) => None,
            Node::Element(element) => Some(Node::Element(Element {
                name: element.name.clone(),
                attributes: element.attributes.clone(),
                children: strip_nodes(&element.children, tags),
            })),
            other => Some(other.clone()),
        })
        .collect()
}
