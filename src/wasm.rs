//! WASM bindings for running passes from a browser host.
//!
//! The host loads the page into a [`Page`] and then sends it the same
//! request objects the native handler accepts.

use wasm_bindgen::prelude::*;

use crate::dom::Document;
use crate::error::Error;
use crate::invoke::{self, Request, Response};
use crate::pass::Options;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// A loaded document and the options its passes run with.
///
/// Methods take `&mut self`, so a call made while another is still running
/// on the same page is rejected by the binding instead of interleaving.
#[wasm_bindgen]
pub struct Page {
    doc: Document,
    options: Options,
}

#[wasm_bindgen]
impl Page {
    #[wasm_bindgen(constructor)]
    pub fn new(html: &str, prefers_dark: bool) -> Self {
        Self {
            doc: Document::parse(html),
            options: Options::default().with_prefers_dark(prefers_dark),
        }
    }

    /// Add an author stylesheet applied after the page's own.
    #[wasm_bindgen(js_name = addStylesheet)]
    pub fn add_stylesheet(&mut self, css: String) {
        self.options.extra_css.push(css);
    }

    /// Handle a request object such as `{ action: "process_page" }` and
    /// return the response object.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, message: JsValue) -> Result<JsValue, JsValue> {
        let response = match serde_wasm_bindgen::from_value::<Request>(message) {
            Ok(request) => invoke::handle(&mut self.doc, &self.options, request),
            Err(e) => Response::error(&Error::InvalidRequest(e.to_string())),
        };
        serde_wasm_bindgen::to_value(&response)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Serialize the page in its current state.
    #[wasm_bindgen(js_name = toHtml)]
    pub fn to_html(&self) -> Result<String, JsValue> {
        self.doc
            .to_html()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Rewrite an HTML string in one call.
#[wasm_bindgen]
pub fn bionify_html(html: &str, prefers_dark: bool) -> Result<String, JsValue> {
    let options = Options::default().with_prefers_dark(prefers_dark);
    crate::bionify_html(html, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}
