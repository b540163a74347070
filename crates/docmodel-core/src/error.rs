//! Error types for document ingestion and serialization.

use thiserror::Error;

/// Errors that can occur while reading attribute input or writing a document.
///
/// Building, sorting and deduplicating a document never fails; only the
/// edges that touch external bytes do.
#[derive(Error, Debug)]
pub enum DocError {
    /// The underlying writer rejected the serialized output.
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON attribute input could not be parsed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The JSON attribute input parsed, but its top level is not an object.
    #[error("attribute input must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Convenience alias used throughout docmodel-core.
pub type Result<T> = std::result::Result<T, DocError>;
