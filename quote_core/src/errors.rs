//! # Error Types
//!
//! Structured error types for quote_core. The calculation engine itself is
//! total (weight and totals functions never fail); errors only arise at the
//! persistence boundary, so the taxonomy here is deliberately small.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::errors::{QuoteError, QuoteResult};
//!
//! fn check_path(path: &str) -> QuoteResult<()> {
//!     if path.is_empty() {
//!         return Err(QuoteError::file_error("open", path, "empty path"));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for quote_core operations
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Structured error type for persistence and record handling.
///
/// Note that the absence of a saved record is *not* an error; loads return
/// `Ok(None)` in that case and the session starts fresh.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum QuoteError {
    /// File I/O error during save or load
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl QuoteError {
    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        QuoteError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        QuoteError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            QuoteError::FileError { .. } => "FILE_ERROR",
            QuoteError::SerializationError { .. } => "SERIALIZATION_ERROR",
            QuoteError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        QuoteError::serialization(err.to_string())
    }
}
