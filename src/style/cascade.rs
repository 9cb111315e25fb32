//! Cascade and inheritance for the properties the rewriter reads.

use std::cell::RefCell;
use std::collections::HashMap;

use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::{MatchingForInvalidation, MatchingMode, NeedsSelectorFlags};

use super::element_ref::ElementRef;
use super::stylesheet::{Declaration, Origin, Specificity, Stylesheet, parse_declarations};
use super::values::{
    DEFAULT_COLOR, DEFAULT_DISPLAY, NORMAL_WEIGHT, TRANSPARENT, WideKeyword, normalize_color,
    resolve_display, resolve_font_weight,
};
use super::{ComputedStyle, StyleLookup};
use crate::dom::{Document, NodeId};

/// Built-in defaults, applied below every document sheet.
const USER_AGENT_CSS: &str = r#"
html, body, address, article, aside, blockquote, div, dl, dd, dt, figure,
figcaption, footer, form, h1, h2, h3, h4, h5, h6, header, hr, li, main, nav,
ol, p, pre, section, table, ul, details, summary { display: block; }
head, script, style, template, title, meta, link, base, noscript,
datalist, param, [hidden] { display: none; }
b, strong, h1, h2, h3, h4, h5, h6, th { font-weight: bold; }
"#;

/// The user-agent stylesheet.
pub fn user_agent_stylesheet() -> Stylesheet {
    Stylesheet::parse(USER_AGENT_CSS)
}

/// A declaration that applies to an element, with its cascade key.
#[derive(Debug)]
struct Matched<'a> {
    declaration: &'a Declaration,
    origin: Origin,
    inline: bool,
    specificity: Specificity,
    order: usize,
}

impl Matched<'_> {
    /// Later sorts win.
    fn key(&self) -> (bool, Origin, bool, Specificity, usize) {
        (
            self.declaration.important,
            self.origin,
            self.inline,
            self.specificity,
            self.order,
        )
    }
}

/// Style resolution over a set of stylesheets.
///
/// Resolved styles are memoized by node, so one `Cascade` should live for
/// one pass: the renderer only inserts new nodes, which never changes the
/// style of elements already resolved.
pub struct Cascade {
    sheets: Vec<(Stylesheet, Origin)>,
    prefers_dark: bool,
    cache: RefCell<HashMap<NodeId, ComputedStyle>>,
}

impl Cascade {
    /// Build a cascade from explicit sheets; the user-agent sheet is added
    /// first.
    pub fn new(author_sheets: Vec<Stylesheet>, prefers_dark: bool) -> Self {
        let mut sheets = vec![(user_agent_stylesheet(), Origin::UserAgent)];
        sheets.extend(author_sheets.into_iter().map(|s| (s, Origin::Author)));
        Self {
            sheets,
            prefers_dark,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Build a cascade from the document's own `<style>` elements, in
    /// document order, followed by `extra_css`.
    pub fn for_document(doc: &Document, extra_css: &[String], prefers_dark: bool) -> Self {
        let mut sheets: Vec<Stylesheet> = embedded_stylesheets(doc)
            .iter()
            .map(|css| Stylesheet::parse(css))
            .collect();
        sheets.extend(extra_css.iter().map(|css| Stylesheet::parse(css)));
        log::debug!(
            "cascade built from {} author stylesheet(s), prefers_dark={prefers_dark}",
            sheets.len()
        );
        Self::new(sheets, prefers_dark)
    }

    /// Resolve the style of `element`, computing uncached ancestors first.
    pub fn resolve(&self, doc: &Document, element: NodeId) -> ComputedStyle {
        if let Some(style) = self.cache.borrow().get(&element) {
            return style.clone();
        }

        let mut pending = vec![element];
        let mut inherited: Option<ComputedStyle> = None;
        for ancestor in doc.ancestors(element) {
            if !doc.is_element(ancestor) {
                break;
            }
            if let Some(style) = self.cache.borrow().get(&ancestor) {
                inherited = Some(style.clone());
                break;
            }
            pending.push(ancestor);
        }

        let mut style = ComputedStyle::default();
        for &id in pending.iter().rev() {
            style = self.compute(doc, id, inherited.as_ref());
            self.cache.borrow_mut().insert(id, style.clone());
            inherited = Some(style.clone());
        }
        style
    }

    fn compute(&self, doc: &Document, element: NodeId, parent: Option<&ComputedStyle>) -> ComputedStyle {
        let initial = ComputedStyle::default();
        let parent = parent.unwrap_or(&initial);
        let elem = ElementRef::new(doc, element);

        let mut matched = Vec::new();
        let mut order = 0;
        for (sheet, origin) in &self.sheets {
            for rule in &sheet.rules {
                let Some(specificity) = match_specificity(elem, &rule.selectors) else {
                    continue;
                };
                for declaration in &rule.declarations {
                    matched.push(Matched {
                        declaration,
                        origin: *origin,
                        inline: false,
                        specificity,
                        order,
                    });
                    order += 1;
                }
            }
        }

        let inline_decls = doc
            .get_attr(element, "style")
            .map(parse_declarations)
            .unwrap_or_default();
        for declaration in &inline_decls {
            matched.push(Matched {
                declaration,
                origin: Origin::Author,
                inline: true,
                specificity: Specificity::default(),
                order,
            });
            order += 1;
        }

        matched.sort_by_key(Matched::key);

        // Inherited properties start from the parent, the rest from initial values.
        let mut style = ComputedStyle {
            color: parent.color.clone(),
            font_weight: parent.font_weight.clone(),
            ..ComputedStyle::default()
        };
        let mut background_is_current_color = false;

        for m in &matched {
            let value = m.declaration.value.as_str();
            let keyword = WideKeyword::parse(value);
            match m.declaration.property.as_str() {
                "color" => match keyword {
                    Some(WideKeyword::Initial) => style.color = DEFAULT_COLOR.to_string(),
                    Some(_) => style.color = parent.color.clone(),
                    None if value.eq_ignore_ascii_case("currentcolor") => {
                        style.color = parent.color.clone();
                    }
                    None => {
                        if let Some(color) = normalize_color(value) {
                            style.color = color;
                        }
                    }
                },
                "background-color" => {
                    match keyword {
                        Some(WideKeyword::Inherit) => {
                            style.background_color = parent.background_color.clone();
                        }
                        Some(_) => style.background_color = TRANSPARENT.to_string(),
                        None if value.eq_ignore_ascii_case("currentcolor") => {
                            background_is_current_color = true;
                            continue;
                        }
                        None => match normalize_color(value) {
                            Some(color) => style.background_color = color,
                            None => continue,
                        },
                    }
                    background_is_current_color = false;
                }
                "font-weight" => match keyword {
                    Some(WideKeyword::Initial) => style.font_weight = NORMAL_WEIGHT.to_string(),
                    Some(_) => style.font_weight = parent.font_weight.clone(),
                    None => {
                        if let Some(weight) = resolve_font_weight(value, &parent.font_weight) {
                            style.font_weight = weight;
                        }
                    }
                },
                "display" => match keyword {
                    Some(WideKeyword::Inherit) => style.display = parent.display.clone(),
                    Some(_) => style.display = DEFAULT_DISPLAY.to_string(),
                    None => {
                        if let Some(display) = resolve_display(value) {
                            style.display = display;
                        }
                    }
                },
                _ => {}
            }
        }

        if background_is_current_color {
            style.background_color = style.color.clone();
        }
        style
    }
}

impl StyleLookup for Cascade {
    fn computed_style(&self, doc: &Document, element: NodeId) -> ComputedStyle {
        self.resolve(doc, element)
    }

    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }
}

/// Highest specificity among the selectors of a rule that match `elem`.
fn match_specificity(
    elem: ElementRef<'_>,
    selectors: &[selectors::parser::Selector<super::element_ref::PageSelectors>],
) -> Option<Specificity> {
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );

    selectors
        .iter()
        .filter(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
        .map(Specificity::from_selector)
        .max()
}

/// Text of every `<style>` element, in document order.
pub fn embedded_stylesheets(doc: &Document) -> Vec<String> {
    let mut sheets = Vec::new();
    let mut stack = vec![doc.document()];
    while let Some(id) = stack.pop() {
        if doc.is_element_named(id, "style") {
            let css = doc.text_content(id);
            if !css.trim().is_empty() {
                sheets.push(css);
            }
            continue;
        }
        let children: Vec<_> = doc.children(id).collect();
        stack.extend(children.into_iter().rev());
    }
    sheets
}
