//! Unified error types for the pitaya library.
//!
//! Structural per-slide issues (missing placeholder roles, layout index
//! fallback) are recovered inside the mapper and never surface here; this
//! type covers the fatal classes that abort a whole transformation.
use thiserror::Error;

/// Main error type for pitaya operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded file is not a valid presentation container
    #[error("Malformed deck: {0}")]
    MalformedDeck(String),

    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::opc::error::OpcError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// The generative rewrite response failed validation against the
    /// outline schema
    #[error("Rewrite response rejected: {0}; ask the model again")]
    SchemaViolation(String),

    /// Network or authentication failure talking to the rewrite endpoint
    #[error("Rewrite request failed: {0}")]
    Rewrite(String),

    /// Requested layout index does not exist on the deck
    #[error("Layout index {requested} out of range (deck has {available} layouts)")]
    LayoutOutOfRange { requested: usize, available: usize },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for pitaya operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
