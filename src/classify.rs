//! Style context classification: is text already bold, and does it sit on
//! a dark background.
//!
//! Both checks are pure reads of the tree and of resolved style. Verdicts
//! are computed per text node and never cached.

use std::iter;

use crate::dom::{Document, NodeId};
use crate::style::StyleLookup;

/// Luminance assigned to colors that cannot be parsed, transparent ones
/// included.
pub const NEUTRAL_LUMINANCE: f64 = 128.0;

/// Backgrounds darker than this count as dark.
pub const DARK_BACKGROUND_MAX: f64 = 100.0;

/// Foregrounds brighter than this count as light.
pub const LIGHT_FOREGROUND_MIN: f64 = 150.0;

/// Lowest numeric font weight treated as bold.
const BOLD_WEIGHT_MIN: f64 = 600.0;

/// Classification of the element around a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleVerdict {
    /// Text is already rendered bold by the element or an ancestor.
    pub already_bold: bool,
    /// Light text on a dark background.
    pub dark_context: bool,
}

/// Classify the context of a text node whose parent is `element`.
pub fn classify(doc: &Document, styles: &dyn StyleLookup, element: NodeId) -> StyleVerdict {
    StyleVerdict {
        already_bold: is_bold_context(doc, styles, element),
        dark_context: is_dark_context(doc, styles, Some(element)),
    }
}

/// True if `element` or one of its ancestors, up to and including `<body>`,
/// is a `<strong>`/`<b>` element or resolves to a bold font weight.
pub fn is_bold_context(doc: &Document, styles: &dyn StyleLookup, element: NodeId) -> bool {
    for id in iter::once(element).chain(doc.ancestors(element)) {
        if !doc.is_element(id) {
            continue;
        }
        if doc.is_element_named(id, "strong") || doc.is_element_named(id, "b") {
            return true;
        }
        if is_bold_weight(&styles.computed_style(doc, id).font_weight) {
            return true;
        }
        if doc.is_element_named(id, "body") {
            break;
        }
    }
    false
}

/// `bold`, `700`, or any numeric weight of at least 600.
pub fn is_bold_weight(weight: &str) -> bool {
    let weight = weight.trim();
    if weight.eq_ignore_ascii_case("bold") {
        return true;
    }
    weight
        .parse::<f64>()
        .is_ok_and(|n| n >= BOLD_WEIGHT_MIN)
}

/// True if `node` is an element showing light text on a dark background.
///
/// Local contrast is required: the host's dark-mode preference alone never
/// makes a context dark.
pub fn is_dark_context(doc: &Document, styles: &dyn StyleLookup, node: Option<NodeId>) -> bool {
    let Some(element) = node.filter(|&id| doc.is_element(id)) else {
        return false;
    };

    let prefers_dark = styles.prefers_dark();
    let style = styles.computed_style(doc, element);
    let background = luminance(&style.background_color);
    let foreground = luminance(&style.color);
    let locally_dark = background < DARK_BACKGROUND_MAX && foreground > LIGHT_FOREGROUND_MIN;

    if prefers_dark && !locally_dark {
        log::trace!(
            "host prefers dark but {:?} is not locally dark (bg {background:.1}, fg {foreground:.1})",
            doc.element_name(element)
        );
    }
    locally_dark
}

/// Perceived luminance of a color string, 0-255.
///
/// `L = 0.2126 R + 0.7152 G + 0.0722 B`. Unparsable and fully transparent
/// colors get [`NEUTRAL_LUMINANCE`].
pub fn luminance(color: &str) -> f64 {
    match parse_rgb(color) {
        Some((r, g, b)) => 0.2126 * r + 0.7152 * g + 0.0722 * b,
        None => NEUTRAL_LUMINANCE,
    }
}

/// Parse `rgb()`/`rgba()`, `#rrggbb` or `#rgb` into 0-255 channels.
pub fn parse_rgb(color: &str) -> Option<(f64, f64, f64)> {
    let color = color.trim().to_ascii_lowercase();

    if let Some(hex) = color.strip_prefix('#') {
        return parse_hex(hex);
    }

    let args = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if !(3..=4).contains(&parts.len()) {
        return None;
    }

    if let Some(alpha) = parts.get(3)
        && parse_alpha(alpha)? <= 0.0
    {
        return None;
    }

    Some((
        parse_channel(parts[0])?,
        parse_channel(parts[1])?,
        parse_channel(parts[2])?,
    ))
}

fn parse_hex(hex: &str) -> Option<(f64, f64, f64)> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |s: &str| u8::from_str_radix(s, 16).ok().map(f64::from);
    match hex.len() {
        3 => Some((
            digit(&hex[0..1])? * 17.0,
            digit(&hex[1..2])? * 17.0,
            digit(&hex[2..3])? * 17.0,
        )),
        6 => Some((digit(&hex[0..2])?, digit(&hex[2..4])?, digit(&hex[4..6])?)),
        _ => None,
    }
}

fn parse_channel(s: &str) -> Option<f64> {
    let value = match s.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? * 2.55,
        None => s.parse::<f64>().ok()?,
    };
    Some(value.clamp(0.0, 255.0))
}

fn parse_alpha(s: &str) -> Option<f64> {
    match s.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok().map(|v| v / 100.0),
        None => s.parse::<f64>().ok(),
    }
}
