//! Error types for bionify operations.

use thiserror::Error;

/// Errors that can occur while loading, processing or writing a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Processing failed: {0}")]
    Pass(String),

    #[error("HTML serialization error: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, Error>;
