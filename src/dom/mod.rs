//! Owned HTML document model.
//!
//! Documents are parsed with html5ever into an arena ([`Document`]) that the
//! scanner reads and the renderer edits in place, then written back out
//! with html5ever's serializer.

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{Ancestors, Attribute, Children, Document, Node, NodeData, NodeId};
pub use serialize::{SerializableNode, serialize_children, serialize_document, serialize_node};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

use tree_sink::DocumentSink;

/// Parse an HTML string. Never fails; malformed markup is recovered the
/// way a browser would.
pub fn parse_html(html: &str) -> Document {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(DocumentSink::new(), opts)
        .from_utf8()
        .one(html.as_bytes())
        .into_document()
}

/// Parse raw HTML bytes, detecting the encoding from a BOM, the
/// document's own declaration, or falling back to Windows-1252.
pub fn parse_html_bytes(bytes: &[u8]) -> Document {
    let hint = crate::util::extract_encoding_hint(bytes);
    let html = crate::util::decode_text(bytes, hint);
    parse_html(&html)
}

impl Document {
    /// Parse an HTML string into a document.
    pub fn parse(html: &str) -> Self {
        parse_html(html)
    }

    /// Parse HTML bytes of unknown encoding into a document.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        parse_html_bytes(bytes)
    }

    /// Serialize the document back to HTML.
    pub fn to_html(&self) -> std::io::Result<String> {
        serialize_document(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctype_survives_round_trip() {
        let doc = Document::parse("<!DOCTYPE html><html><body><p>x</p></body></html>");
        let html = doc.to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_parse_bytes_latin1() {
        let doc = Document::parse_bytes(b"<meta charset=\"iso-8859-1\"><p>caf\xE9</p>");
        let p = doc.find_by_tag("p").unwrap();
        assert_eq!(doc.text_content(p), "café");
    }
}
