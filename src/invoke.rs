//! Command handler between an invoker and the rewriting pass.
//!
//! The invoker sends a [`Request`] and gets back exactly one [`Response`].
//! The handler is synchronous and knows nothing about transport: the CLI
//! calls it directly, the wasm binding passes JS objects through it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::dom::Document;
use crate::error::{Error, Result};
use crate::pass::{Options, PassReport, process_document};

/// A message from the invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    /// Rewrite the text of the current document.
    ProcessPage,
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success {
        /// Candidate text nodes the pass attempted.
        processed: usize,
        modified: usize,
        words: usize,
    },
    Error {
        error: String,
    },
}

impl Response {
    pub fn success(report: PassReport) -> Self {
        Response::Success {
            processed: report.attempted,
            modified: report.modified,
            words: report.words,
        }
    }

    pub fn error(err: &Error) -> Self {
        Response::Error {
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }
}

/// Handle a request against `doc`.
///
/// A failure anywhere in the pass, panics included, comes back as
/// [`Response::Error`]. Nodes replaced before the failure stay replaced.
pub fn handle(doc: &mut Document, options: &Options, request: Request) -> Response {
    match request {
        Request::ProcessPage => match process_page(doc, options) {
            Ok(report) => Response::success(report),
            Err(err) => {
                log::error!("{err}");
                Response::error(&err)
            }
        },
    }
}

/// Decode a JSON request, handle it, and encode the response.
///
/// Malformed or unknown requests produce an error response rather than an
/// `Err`; only encoding the response can fail.
pub fn handle_json(doc: &mut Document, options: &Options, request: &str) -> Result<String> {
    let response = match parse_request(request) {
        Ok(request) => handle(doc, options, request),
        Err(err) => {
            log::warn!("rejected request: {err}");
            Response::error(&err)
        }
    };
    Ok(serde_json::to_string(&response)?)
}

/// Decode a JSON request.
pub fn parse_request(json: &str) -> Result<Request> {
    serde_json::from_str(json).map_err(|e| Error::InvalidRequest(e.to_string()))
}

/// Run the pass over `doc`, turning a panic into [`Error::Pass`].
pub fn process_page(doc: &mut Document, options: &Options) -> Result<PassReport> {
    panic::catch_unwind(AssertUnwindSafe(|| process_document(doc, options)))
        .map_err(|payload| Error::Pass(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_page_success() {
        let mut doc = Document::parse("<p>hello world</p>");
        let json = handle_json(&mut doc, &Options::default(), r#"{"action":"process_page"}"#).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["processed"], 1);
        assert_eq!(value["modified"], 1);
        assert_eq!(value["words"], 2);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_unknown_action_is_error_response() {
        let mut doc = Document::parse("<p>hello</p>");
        let json = handle_json(&mut doc, &Options::default(), r#"{"action":"explode"}"#).unwrap();

        let response: Response = serde_json::from_str(&json).unwrap();
        assert!(!response.is_success());
        assert_eq!(doc.to_html().unwrap(), Document::parse("<p>hello</p>").to_html().unwrap());
    }

    #[test]
    fn test_missing_action_and_bad_json() {
        let mut doc = Document::parse("<p>hello</p>");
        for request in ["{}", "not json", r#"{"action": 3}"#] {
            let json = handle_json(&mut doc, &Options::default(), request).unwrap();
            assert!(json.contains(r#""status":"error""#), "{request}: {json}");
        }
    }

    #[test]
    fn test_request_round_trip_shape() {
        assert_eq!(
            serde_json::to_string(&Request::ProcessPage).unwrap(),
            r#"{"action":"process_page"}"#
        );
        let request = parse_request(r#"{"action":"process_page","tab":7}"#).unwrap();
        assert_eq!(request, Request::ProcessPage);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload = panic::catch_unwind(|| -> usize { panic!("boom {}", 1) }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 1");

        let payload = panic::catch_unwind(|| -> usize { panic!("static") }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");
    }

    #[test]
    fn test_process_page_reports_counts() {
        let mut doc = Document::parse("<p>one two</p><pre>skip</pre>");
        let report = process_page(&mut doc, &Options::default()).unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.words, 2);
    }

    #[test]
    fn test_error_response_shape() {
        let response = Response::error(&Error::Pass("boom".into()));
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"status":"error","error":"Processing failed: boom"}"#
        );
    }
}
