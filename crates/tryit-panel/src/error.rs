//! Error types for tryit-panel

use openapi_fragment::ResolveError;
use thiserror::Error;

/// Result type alias for panel operations
pub type Result<T> = std::result::Result<T, PanelError>;

/// Panel error types
#[derive(Error, Debug)]
pub enum PanelError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field name {name} is ambiguous, use one of: {candidates}")]
    AmbiguousField { name: String, candidates: String },

    #[error("Server {index} out of range ({count} servers declared)")]
    ServerOutOfRange { index: usize, count: usize },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Failure of a single request execution.
///
/// Shown in the result area; the form stays usable afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    #[error("No server available for this operation")]
    NoServer,

    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Missing value for path parameter {0}")]
    MissingPathParameter(String),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Network(String),

    #[error("Response is not JSON (HTTP {status}, content type {content_type})")]
    NonJsonBody { status: u16, content_type: String },

    #[error("Failed to decode JSON response (HTTP {status}): {reason}")]
    Decode { status: u16, reason: String },

    #[error("Request cancelled")]
    Cancelled,
}
