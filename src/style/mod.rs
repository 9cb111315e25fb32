//! Computed style for document elements.
//!
//! The rewriter never reads declared CSS directly; it asks a
//! [`StyleLookup`] for the resolved value of a property, the same
//! information a browser exposes through `getComputedStyle`. [`Cascade`]
//! is the stock implementation backed by the document's stylesheets.

mod cascade;
mod element_ref;
mod stylesheet;
mod values;

pub use cascade::{Cascade, embedded_stylesheets, user_agent_stylesheet};
pub use element_ref::{ElementRef, PageSelectors};
pub use stylesheet::{CssRule, Declaration, Origin, Specificity, Stylesheet, parse_declarations};
pub use values::{DEFAULT_COLOR, DEFAULT_DISPLAY, NORMAL_WEIGHT, TRANSPARENT};

use crate::dom::{Document, NodeId};

/// Resolved values of the properties the rewriter consults.
///
/// Values are strings in the shape `getComputedStyle` reports them:
/// numeric font weights and, for named colors, `rgb(r, g, b)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    pub color: String,
    pub background_color: String,
    pub font_weight: String,
    pub display: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            background_color: TRANSPARENT.to_string(),
            font_weight: NORMAL_WEIGHT.to_string(),
            display: DEFAULT_DISPLAY.to_string(),
        }
    }
}

/// Read access to resolved styles and the environment's appearance
/// preference.
pub trait StyleLookup {
    /// Resolved style of an element.
    fn computed_style(&self, doc: &Document, element: NodeId) -> ComputedStyle;

    /// Whether the host prefers a dark color scheme. Best effort.
    fn prefers_dark(&self) -> bool {
        false
    }
}
