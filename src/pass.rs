//! One full rewriting pass over a document.

use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::dom::Document;
use crate::render::{RenderOutcome, render_text_node};
use crate::scan::Scanner;
use crate::style::{Cascade, StyleLookup};

/// Settings for a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// The host's color-scheme preference.
    pub prefers_dark: bool,
    /// Author stylesheets applied after the document's own `<style>`
    /// elements.
    pub extra_css: Vec<String>,
}

impl Options {
    pub fn with_prefers_dark(mut self, prefers_dark: bool) -> Self {
        self.prefers_dark = prefers_dark;
        self
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.extra_css.push(css.into());
        self
    }
}

/// Counts gathered during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// Candidate text nodes visited.
    pub attempted: usize,
    /// Text nodes replaced by a fragment.
    pub modified: usize,
    /// Words split across all replaced nodes.
    pub words: usize,
}

/// Run a pass with styles resolved from the document's stylesheets.
pub fn process_document(doc: &mut Document, options: &Options) -> PassReport {
    let cascade = Cascade::for_document(doc, &options.extra_css, options.prefers_dark);
    process_with_styles(doc, &cascade)
}

/// Run a pass against an arbitrary style source.
///
/// Candidates are collected up front; each is then classified and rendered
/// in document order.
pub fn process_with_styles(doc: &mut Document, styles: &dyn StyleLookup) -> PassReport {
    let candidates = Scanner::new().scan(doc, styles);
    let mut report = PassReport {
        attempted: candidates.len(),
        ..PassReport::default()
    };

    for node in candidates {
        let Some(parent) = doc.parent(node) else {
            log::debug!("candidate {node:?} detached before rendering");
            continue;
        };
        let verdict = classify(doc, styles, parent);

        match render_text_node(doc, node, verdict) {
            RenderOutcome::Replaced { words } => {
                report.modified += 1;
                report.words += words;
            }
            outcome => log::debug!("left {node:?} untouched: {outcome:?}"),
        }
    }

    log::info!(
        "processed {} text nodes ({} modified, {} words)",
        report.attempted,
        report.modified,
        report.words
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut doc = Document::parse("<p>hello world</p><p><strong>bold</strong></p><p>x</p>");
        let report = process_document(&mut doc, &Options::default());

        assert_eq!(
            report,
            PassReport {
                attempted: 3,
                modified: 2,
                words: 3,
            }
        );
    }

    #[test]
    fn test_extra_css_is_applied() {
        let mut doc = Document::parse("<p class=\"k\">keep</p><p>go</p>");
        let options = Options::default().with_css(".k { font-weight: 700 }");
        let report = process_document(&mut doc, &options);

        assert_eq!(report.attempted, 2);
        assert_eq!(report.modified, 1);
    }

    #[test]
    fn test_second_pass_leaves_rendered_text() {
        let mut doc = Document::parse("<p>hello world</p>");
        process_document(&mut doc, &Options::default());
        let first = doc.to_html().unwrap();

        // Leads are now inside <strong>; tails still get split.
        let report = process_document(&mut doc, &Options::default());
        assert_eq!(report.attempted, 4);
        assert_eq!(report.modified, 2);
        assert_ne!(doc.to_html().unwrap(), first);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: Options = serde_json::from_str(r#"{"prefersDark": true}"#).unwrap();
        assert!(options.prefers_dark);
        assert!(options.extra_css.is_empty());
    }
}
