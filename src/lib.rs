//! # bionify
//!
//! Rewrites the visible text of an HTML document for "bionic reading": the
//! first half of every word is emphasized so the eye can skim along the
//! word starts.
//!
//! ## Features
//!
//! - Parses HTML with html5ever and edits it in place
//! - Resolves `color`, `background-color`, `font-weight` and `display`
//!   from the document's stylesheets, so text that is already bold is left
//!   alone and light-on-dark text gets muted colors instead of `<strong>`
//! - Skips code, form controls, media, hidden and editable regions
//! - Request/response command handler usable from a CLI or from wasm
//!
//! ## Quick Start
//!
//! ```
//! use bionify::{Document, Options, process_document};
//!
//! let mut doc = Document::parse("<p>hello world</p>");
//! let report = process_document(&mut doc, &Options::default());
//!
//! assert_eq!(report.modified, 1);
//! assert!(doc.to_html().unwrap().contains("<strong>hel</strong>lo"));
//! ```
//!
//! ## Message Interface
//!
//! ```
//! use bionify::{Document, Options, invoke};
//!
//! let mut doc = Document::parse("<p>hello</p>");
//! let reply = invoke::handle_json(&mut doc, &Options::default(), r#"{"action":"process_page"}"#)
//!     .unwrap();
//! assert!(reply.starts_with(r#"{"status":"success""#));
//! ```

pub mod classify;
pub mod dom;
pub mod error;
pub mod invoke;
pub mod pass;
pub mod render;
pub mod scan;
pub mod style;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use classify::StyleVerdict;
pub use dom::{Document, NodeId};
pub use error::{Error, Result};
pub use invoke::{Request, Response};
pub use pass::{Options, PassReport, process_document, process_with_styles};
pub use scan::{DENYLIST, Scanner};
pub use style::{Cascade, ComputedStyle, StyleLookup};

/// Parse `html`, run one pass, and serialize the result.
pub fn bionify_html(html: &str, options: &Options) -> Result<String> {
    let mut doc = Document::parse(html);
    process_document(&mut doc, options);
    doc.to_html().map_err(|e| Error::Serialize(e.to_string()))
}
