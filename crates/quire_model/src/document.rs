//! Source documents: items to compile and layouts that wrap them.

use quire_common::{ContentHash, Identifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Structured document attributes (front matter, data-source metadata).
///
/// Keys are unique and ordered, so serializing the map is canonical.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Textual or binary document content.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    /// UTF-8 text content.
    Text(String),
    /// Raw bytes, written to the output unchanged.
    Binary(Vec<u8>),
}

impl Content {
    /// Returns the text, or `None` for binary content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Binary(_) => None,
        }
    }

    /// Returns the content as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(s) => s.as_bytes(),
            Content::Binary(b) => b,
        }
    }

    /// Returns `true` for binary content.
    pub fn is_binary(&self) -> bool {
        matches!(self, Content::Binary(_))
    }

    /// Digest of the content bytes.
    pub fn checksum(&self) -> ContentHash {
        let tag: &[u8] = if self.is_binary() { b"b" } else { b"t" };
        ContentHash::from_parts([tag, self.as_bytes()])
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(s) if s.len() <= 40 => write!(f, "Text({s:?})"),
            Content::Text(s) => write!(f, "Text({} bytes)", s.len()),
            Content::Binary(b) => write!(f, "Binary({} bytes)", b.len()),
        }
    }
}

/// An item or a layout: identifier, raw content and attributes.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable path-like identifier.
    pub identifier: Identifier,
    /// Raw, uncompiled content.
    pub content: Content,
    /// Attributes attached by the data source.
    pub attributes: Attributes,
}

/// A source document that gets compiled into one or more representations.
pub type Item = Document;

/// A wrapping template applied by `layout` actions.
pub type Layout = Document;

impl Document {
    /// Creates a document with no attributes.
    pub fn new(identifier: Identifier, content: impl Into<Content>) -> Self {
        Self {
            identifier,
            content: content.into(),
            attributes: Attributes::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Returns the attribute with the given key.
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// Digest of the raw content.
    pub fn content_checksum(&self) -> ContentHash {
        self.content.checksum()
    }

    /// Digest of the attributes.
    pub fn attributes_checksum(&self) -> ContentHash {
        let bytes = serde_json::to_vec(&self.attributes).unwrap_or_default();
        ContentHash::from_bytes(&bytes)
    }
}

/// Whether a document is an item or a layout.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum DocumentKind {
    /// A compiled item.
    Item,
    /// A layout.
    Layout,
    /// The set of all items. Not a document itself; only a dependency target.
    Collection,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Item => write!(f, "item"),
            DocumentKind::Layout => write!(f, "layout"),
            DocumentKind::Collection => write!(f, "collection"),
        }
    }
}

/// A run-independent reference to a document.
///
/// Dependency edges and checksums are keyed by this type, so they survive
/// documents being added or removed between runs.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Item or layout.
    pub kind: DocumentKind,
    /// The document identifier.
    pub identifier: Identifier,
}

impl DocumentRef {
    /// Refers to the item with the given identifier.
    pub fn item(identifier: Identifier) -> Self {
        Self {
            kind: DocumentKind::Item,
            identifier,
        }
    }

    /// Refers to the layout with the given identifier.
    pub fn layout(identifier: Identifier) -> Self {
        Self {
            kind: DocumentKind::Layout,
            identifier,
        }
    }

    /// Refers to the set of all items.
    ///
    /// Depending on it with an ordered edge makes the dependent outdated
    /// whenever an item is added or removed.
    pub fn item_collection() -> Self {
        Self {
            kind: DocumentKind::Collection,
            identifier: Identifier::root(),
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DocumentKind::Collection => write!(f, "the item collection"),
            _ => write!(f, "{} {}", self.kind, self.identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    #[test]
    fn text_and_binary_checksums_differ() {
        let text = Content::Text("abc".to_string());
        let bin = Content::Binary(b"abc".to_vec());
        assert_ne!(text.checksum(), bin.checksum());
        assert_eq!(text.as_bytes(), bin.as_bytes());
    }

    #[test]
    fn attribute_checksum_is_order_independent() {
        let a = Document::new(id("/a.md"), "x")
            .with_attribute("title", json!("A"))
            .with_attribute("tags", json!(["x", "y"]));
        let b = Document::new(id("/a.md"), "x")
            .with_attribute("tags", json!(["x", "y"]))
            .with_attribute("title", json!("A"));
        assert_eq!(a.attributes_checksum(), b.attributes_checksum());
    }

    #[test]
    fn attribute_change_changes_checksum() {
        let a = Document::new(id("/a.md"), "x").with_attribute("draft", json!(true));
        let b = Document::new(id("/a.md"), "x").with_attribute("draft", json!(false));
        assert_ne!(a.attributes_checksum(), b.attributes_checksum());
        assert_eq!(a.content_checksum(), b.content_checksum());
    }

    #[test]
    fn document_ref_display() {
        assert_eq!(
            DocumentRef::layout(id("/default.html")).to_string(),
            "layout /default.html"
        );
    }

    #[test]
    fn item_collection_display() {
        assert_eq!(DocumentRef::item_collection().to_string(), "the item collection");
        assert_ne!(DocumentRef::item_collection(), DocumentRef::item(id("/")));
    }

    #[test]
    fn document_refs_order_items_first() {
        let item = DocumentRef::item(id("/z"));
        let layout = DocumentRef::layout(id("/a"));
        assert!(item < layout);
    }
}
