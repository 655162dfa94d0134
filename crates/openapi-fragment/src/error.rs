//! Error types for fragment resolution

use serde_json::error::Category;
use thiserror::Error;

/// Result type alias for resolver operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Errors raised while turning a raw payload into an operation descriptor.
///
/// Every variant is fatal for the render pass that produced it.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("JSON parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid operation fragment: {0}")]
    InvalidFormat(String),

    #[error("Fragment is empty: {0}")]
    EmptyPayload(&'static str),

    #[error("Path not found in fragment: {0}")]
    PathNotFound(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("No {method} operation declared for {path}")]
    OperationNotFound { path: String, method: String },
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        // Data errors mean the JSON was well-formed but shaped wrong
        match err.classify() {
            Category::Data => ResolveError::InvalidFormat(err.to_string()),
            Category::Syntax | Category::Eof | Category::Io => ResolveError::Parse(err),
        }
    }
}

impl ResolveError {
    /// Whether this error came from malformed JSON rather than a bad fragment shape
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ResolveError::Parse(_))
    }
}
