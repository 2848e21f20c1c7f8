//! Error types for sigstore-crypto

use thiserror::Error;

/// Errors that can occur in cryptographic operations
#[derive(Error, Debug)]
pub enum Error {
    /// Signature did not verify
    #[error("Verification error: {0}")]
    Verification(String),

    /// Key material could not be parsed
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Key or scheme is not supported by the backend
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// PEM decoding error
    #[error("PEM error: {0}")]
    Pem(#[from] pem::PemError),

    /// DER encoding/decoding error
    #[error("DER error: {0}")]
    Der(#[from] der::Error),

    /// Certificate parsing error
    #[error("Certificate error: {0}")]
    InvalidCertificate(String),

    /// Binary codec error from sigstore-types
    #[error("Encoding error: {0}")]
    Encoding(#[from] sigstore_types::Error),
}

impl From<aws_lc_rs::error::Unspecified> for Error {
    fn from(_: aws_lc_rs::error::Unspecified) -> Self {
        Error::Verification("unspecified crypto error".to_string())
    }
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, Error>;
