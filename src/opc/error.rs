/// Error types for OPC package operations.
use thiserror::Error;

/// Result type for OPC package operations.
pub type Result<T> = std::result::Result<T, OpcError>;

/// Error types for OPC package operations.
#[derive(Error, Debug)]
pub enum OpcError {
    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid partname
    #[error("Invalid partname: {0}")]
    InvalidPackUri(String),

    /// Part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Relationship not found
    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    /// Invalid relationship
    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Malformed content types stream
    #[error("Malformed [Content_Types].xml: {0}")]
    ContentTypes(String),
}
