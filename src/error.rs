//! Error types for sharefront.

use thiserror::Error;

/// Common error type for sharefront.
#[derive(Error, Debug)]
pub enum SharefrontError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The storage backend rejected or failed an operation.
    ///
    /// Connectivity problems with the file share end up here.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// An upload body did not match its declared length.
    #[error("size mismatch: declared {declared} bytes, received {actual}")]
    SizeMismatch {
        /// Declared size in bytes.
        declared: u64,
        /// Bytes actually received (may stop counting once the declared size is exceeded).
        actual: u64,
    },
}

/// Result type alias for sharefront operations.
pub type Result<T> = std::result::Result<T, SharefrontError>;
