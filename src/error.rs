//! Error types for the Quarry library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`QuarryError`] enum. Malformed queries surface as
//! [`QuarryError::Parse`] and are always recoverable: the index is never
//! touched by a failed parse.
//!
//! # Examples
//!
//! ```
//! use quarry::error::{QuarryError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(QuarryError::index("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

use crate::query::ast::Span;

/// The main error type for Quarry operations.
#[derive(Error, Debug)]
pub enum QuarryError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed query text.
    ///
    /// `span` is the half-open byte range of the offending token, or `None`
    /// when the query ended before the parser was satisfied.
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        span: Option<Span>,
    },

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Persisted index is unreadable (bad magic, version or checksum)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document acquisition errors
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with QuarryError.
pub type Result<T> = std::result::Result<T, QuarryError>;

impl QuarryError {
    /// Create a new parse error pointing at a span of the query.
    pub fn parse<S: Into<String>>(msg: S, span: Option<Span>) -> Self {
        QuarryError::Parse {
            message: msg.into(),
            span,
        }
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        QuarryError::Index(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        QuarryError::Storage(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        QuarryError::SerializationError(msg.into())
    }

    /// Create a new crawl error.
    pub fn crawl<S: Into<String>>(msg: S) -> Self {
        QuarryError::Crawl(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        QuarryError::Other(msg.into())
    }

    /// Whether this error came from parsing a query.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, QuarryError::Parse { .. })
    }

    /// Source span of a parse error, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            QuarryError::Parse { span, .. } => *span,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = QuarryError::index("Test index error");
        assert_eq!(error.to_string(), "Index error: Test index error");

        let error = QuarryError::storage("bad magic");
        assert_eq!(error.to_string(), "Storage error: bad magic");

        let error = QuarryError::parse("missing ')'", Some(Span::new(3, 4)));
        assert_eq!(error.to_string(), "Parse error: missing ')'");
        assert!(error.is_parse_error());
        assert_eq!(error.span(), Some(Span::new(3, 4)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let quarry_error = QuarryError::from(io_error);

        match quarry_error {
            QuarryError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
        assert!(!QuarryError::other("x").is_parse_error());
    }
}
