//! Error types for lexanno.

use thiserror::Error;

/// Result type for lexanno operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for lexanno operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required directory or table file is absent.
    #[error("Missing resource: {0}")]
    MissingResource(String),

    /// A table violates its schema (duplicate id, malformed value, missing column).
    #[error("Format error: {0}")]
    Format(String),

    /// A judgment record is not shaped as required.
    #[error("Invalid judgment: {0}")]
    Validation(String),

    /// A lookup by id found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a missing-resource error.
    pub fn missing_resource(msg: impl Into<String>) -> Self {
        Error::MissingResource(msg.into())
    }

    /// Create a format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }
}
