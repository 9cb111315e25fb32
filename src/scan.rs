//! Discovery of the text nodes a pass may rewrite.

use std::collections::HashSet;

use crate::dom::{Document, NodeData, NodeId};
use crate::style::StyleLookup;

/// Elements whose text is never prose: scripts and styles, form controls,
/// code, embedded media, and page furniture.
pub const DENYLIST: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "textarea", "input", "select",
    "option", "optgroup", "button", "code", "pre", "kbd", "samp", "var", "svg", "math", "canvas",
    "video", "audio", "iframe", "object", "embed", "img", "picture", "header", "details",
    "summary",
];

/// Why an element's subtree is excluded from a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Denylisted,
    Editable,
    Hidden,
}

/// Walks a document's body and collects the text nodes eligible for
/// rendering.
#[derive(Debug, Clone)]
pub struct Scanner {
    denylist: HashSet<&'static str>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            denylist: DENYLIST.iter().copied().collect(),
        }
    }

    pub fn is_denylisted(&self, tag: &str) -> bool {
        self.denylist.contains(tag)
    }

    /// Collect candidate text nodes in document order.
    ///
    /// The whole list is built before the caller mutates anything, so
    /// replacements made while rendering never feed back into the scan.
    pub fn scan(&self, doc: &Document, styles: &dyn StyleLookup) -> Vec<NodeId> {
        let Some(body) = doc.body() else {
            log::debug!("document has no body, nothing to scan");
            return Vec::new();
        };

        // The body and everything above it get the same checks as the
        // elements below.
        let mut outer = std::iter::once(body).chain(doc.ancestors(body));
        if let Some((id, reason)) = outer.find_map(|id| Some(id).zip(self.rejects(doc, styles, id))) {
            log::debug!("body excluded by {:?}: {reason:?}", doc.element_name(id));
            return Vec::new();
        }

        let mut candidates = Vec::new();
        let mut stack: Vec<NodeId> = doc.children(body).collect();
        stack.reverse();

        while let Some(id) = stack.pop() {
            let Some(node) = doc.get(id) else { continue };
            match &node.data {
                NodeData::Text(text) => {
                    if !text.trim().is_empty() {
                        candidates.push(id);
                    }
                }
                NodeData::Element { .. } => {
                    if let Some(reason) = self.rejects(doc, styles, id) {
                        log::trace!("skipping {:?} subtree: {reason:?}", doc.element_name(id));
                        continue;
                    }
                    let len = stack.len();
                    stack.extend(doc.children(id));
                    stack[len..].reverse();
                }
                _ => {}
            }
        }

        candidates
    }

    /// Check a single element, without looking at its ancestors.
    pub fn rejects(&self, doc: &Document, styles: &dyn StyleLookup, element: NodeId) -> Option<Rejection> {
        let name = doc.element_name(element)?;
        if self.is_denylisted(name.as_ref()) {
            return Some(Rejection::Denylisted);
        }
        if is_editable(doc, element) {
            return Some(Rejection::Editable);
        }
        if styles.computed_style(doc, element).display == "none" {
            return Some(Rejection::Hidden);
        }
        None
    }
}

/// True if the element itself carries an enabling `contenteditable`.
pub fn is_editable(doc: &Document, element: NodeId) -> bool {
    doc.get_attr(element, "contenteditable").is_some_and(|value| {
        let value = value.trim();
        value.is_empty()
            || value.eq_ignore_ascii_case("true")
            || value.eq_ignore_ascii_case("plaintext-only")
    })
}
