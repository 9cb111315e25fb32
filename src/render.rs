//! Word splitting and fragment rendering.
//!
//! A text node's string is cut into alternating whitespace runs and words.
//! Every word gets its first `ceil(len / 2)` characters emphasized; the
//! whitespace runs pass through untouched so the rendered fragment reads
//! back as exactly the original string.

use crate::classify::StyleVerdict;
use crate::dom::{Document, NodeId};

/// Inline style of the emphasized half of a word in a dark context.
pub const DARK_LEAD_STYLE: &str = "font-weight: bold; color: #D4D4D4";

/// Inline style of the remaining half of a word in a dark context.
pub const DARK_TAIL_STYLE: &str = "font-weight: normal; color: #AAAAAA";

/// One piece of a text node's string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A whitespace run, passed through unchanged.
    Space(&'a str),
    /// A word split into its emphasized lead and plain tail.
    Word { lead: &'a str, tail: &'a str },
}

impl Segment<'_> {
    pub fn is_word(&self) -> bool {
        matches!(self, Segment::Word { .. })
    }
}

/// Number of leading characters emphasized in a word of `len` characters.
pub fn split_point(len: usize) -> usize {
    len.div_ceil(2)
}

/// Split a word into lead and tail at [`split_point`], counting characters
/// rather than bytes.
pub fn split_word(word: &str) -> (&str, &str) {
    let at = split_point(word.chars().count());
    let byte = word
        .char_indices()
        .nth(at)
        .map_or(word.len(), |(index, _)| index);
    word.split_at(byte)
}

/// Cut a string into whitespace runs and words, in order.
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (index, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(previous) if previous != space => {
                segments.push(make_segment(&text[start..index], previous));
                start = index;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if let Some(space) = in_space {
        segments.push(make_segment(&text[start..], space));
    }
    segments
}

fn make_segment(run: &str, space: bool) -> Segment<'_> {
    if space {
        Segment::Space(run)
    } else {
        let (lead, tail) = split_word(run);
        Segment::Word { lead, tail }
    }
}

/// What happened to a text node handed to [`render_text_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The text is already bold; the node was left alone.
    AlreadyBold,
    /// The string holds no word to split.
    NoWords,
    /// The node lost its parent before it could be replaced.
    Detached,
    /// The node was replaced by a fragment holding `words` split words.
    Replaced { words: usize },
}

/// Render a text node according to its verdict, replacing it in the tree.
///
/// The node is either left exactly as it was or replaced in one step by a
/// fragment with the same text content.
pub fn render_text_node(doc: &mut Document, node: NodeId, verdict: StyleVerdict) -> RenderOutcome {
    if verdict.already_bold {
        return RenderOutcome::AlreadyBold;
    }

    let Some(text) = doc.text(node).map(str::to_owned) else {
        return RenderOutcome::NoWords;
    };
    let segments = segment(&text);
    let words = segments.iter().filter(|s| s.is_word()).count();
    if words == 0 {
        return RenderOutcome::NoWords;
    }
    if doc.parent(node).is_none() {
        return RenderOutcome::Detached;
    }

    let fragment = build_fragment(doc, &segments, verdict.dark_context);
    if doc.replace_with(node, &fragment) {
        RenderOutcome::Replaced { words }
    } else {
        RenderOutcome::Detached
    }
}

/// Create the detached nodes of a fragment for `segments`.
///
/// Consecutive plain runs are merged into a single text node.
pub fn build_fragment(doc: &mut Document, segments: &[Segment<'_>], dark: bool) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let mut pending = String::new();

    for segment in segments {
        match *segment {
            Segment::Space(run) => pending.push_str(run),
            Segment::Word { lead, tail } if dark => {
                flush(doc, &mut nodes, &mut pending);
                nodes.push(styled_span(doc, DARK_LEAD_STYLE, lead));
                if !tail.is_empty() {
                    nodes.push(styled_span(doc, DARK_TAIL_STYLE, tail));
                }
            }
            Segment::Word { lead, tail } => {
                flush(doc, &mut nodes, &mut pending);
                let strong = doc.create_html_element("strong", &[]);
                doc.append_text(strong, lead);
                nodes.push(strong);
                pending.push_str(tail);
            }
        }
    }
    flush(doc, &mut nodes, &mut pending);
    nodes
}

fn styled_span(doc: &mut Document, style: &str, text: &str) -> NodeId {
    let span = doc.create_html_element("span", &[("style", style)]);
    doc.append_text(span, text);
    span
}

fn flush(doc: &mut Document, nodes: &mut Vec<NodeId>, pending: &mut String) {
    if !pending.is_empty() {
        nodes.push(doc.create_text(std::mem::take(pending)));
    }
}
