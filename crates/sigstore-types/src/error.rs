//! Error types for sigstore-types

use thiserror::Error;

/// Errors that can occur in sigstore-types
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A read ran past the end of a byte stream
    #[error("out of bounds: requested {requested} bytes at offset {position}, {remaining} remaining")]
    OutOfBounds {
        /// Cursor position when the read was attempted
        position: usize,
        /// Number of bytes the read needed
        requested: usize,
        /// Number of bytes left in the stream
        remaining: usize,
    },

    /// A value does not fit in its wire field
    #[error("value too large for field: {0}")]
    FieldOverflow(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid hash algorithm
    #[error("Invalid hash algorithm: {0}")]
    InvalidHashAlgorithm(String),
}

/// Result type for sigstore-types operations
pub type Result<T> = std::result::Result<T, Error>;
