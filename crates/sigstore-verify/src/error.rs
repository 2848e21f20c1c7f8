//! Error types for bundle verification

use thiserror::Error;

/// Reasons a bundle is rejected
///
/// Every variant carries a human-readable reason; [`Error::code`] gives the
/// stable machine-readable subcode for it.
#[derive(Error, Debug)]
pub enum Error {
    /// No certificate authority in the trusted root covers the signing time
    #[error("no valid certificate authorities: {0}")]
    NoValidCertificateAuthorities(String),

    /// Every candidate certificate authority failed to build a chain
    #[error("no valid certificate chain: {0}")]
    NoValidCertificateChain(String),

    /// Fewer SCTs verified than the configured threshold
    #[error("insufficient SCTs: {0}")]
    InsufficientScts(String),

    /// An SCT names a CT log the trusted root does not carry a key for
    #[error("unknown CT log: {0}")]
    UnknownLog(String),

    /// Truncated, oversized or otherwise undecodable binary input
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The key selector produced no key
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Key bytes are not a supported PEM or DER public key
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// The signer is not admitted by the signers policy
    #[error("untrusted signer: {0}")]
    UntrustedSigner(String),

    /// A message signature bundle was verified without its artifact
    #[error("missing artifact: {0}")]
    MissingArtifact(String),

    /// Signature, digest or subject did not match
    #[error("signature mismatch: {0}")]
    SignatureMismatch(String),

    /// Bundle certificate could not be parsed or lacks what verification needs
    #[error("malformed certificate: {0}")]
    MalformedCertificate(String),

    /// Fewer transparency log entries verified than the configured threshold
    #[error("insufficient transparency log entries: {0}")]
    InsufficientTlogEntries(String),

    /// Transparency log checks are enabled but nothing can perform them
    #[error("transparency log verifier unavailable: {0}")]
    TlogVerifierUnavailable(String),

    /// Bundle could not be decoded
    #[error("malformed bundle: {0}")]
    Bundle(#[from] sigstore_types::Error),
}

impl Error {
    /// Stable subcode for this failure
    pub fn code(&self) -> &'static str {
        match self {
            Error::NoValidCertificateAuthorities(_) => "NO_VALID_CERTIFICATE_AUTHORITIES",
            Error::NoValidCertificateChain(_) => "NO_VALID_CERTIFICATE_CHAIN",
            Error::InsufficientScts(_) => "INSUFFICIENT_SCTS",
            Error::UnknownLog(_) => "UNKNOWN_LOG",
            Error::MalformedInput(_) => "MALFORMED_INPUT",
            Error::KeyNotFound(_) => "KEY_NOT_FOUND",
            Error::MalformedKey(_) => "MALFORMED_KEY",
            Error::UntrustedSigner(_) => "UNTRUSTED_SIGNER",
            Error::MissingArtifact(_) => "MISSING_ARTIFACT",
            Error::SignatureMismatch(_) => "SIGNATURE_MISMATCH",
            Error::MalformedCertificate(_) => "MALFORMED_CERTIFICATE",
            Error::InsufficientTlogEntries(_) => "INSUFFICIENT_TLOG_ENTRIES",
            Error::TlogVerifierUnavailable(_) => "TLOG_VERIFIER_UNAVAILABLE",
            Error::Bundle(_) => "MALFORMED_BUNDLE",
        }
    }
}

/// Result type for verification
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::NoValidCertificateAuthorities(String::new()), "NO_VALID_CERTIFICATE_AUTHORITIES")]
    #[case(Error::InsufficientScts(String::new()), "INSUFFICIENT_SCTS")]
    #[case(Error::UnknownLog(String::new()), "UNKNOWN_LOG")]
    #[case(Error::KeyNotFound(String::new()), "KEY_NOT_FOUND")]
    #[case(Error::SignatureMismatch(String::new()), "SIGNATURE_MISMATCH")]
    #[case(
        Error::Bundle(sigstore_types::Error::MissingField("content".into())),
        "MALFORMED_BUNDLE"
    )]
    fn test_codes(#[case] error: Error, #[case] code: &str) {
        assert_eq!(error.code(), code);
    }

    #[test]
    fn test_display_keeps_reason() {
        let error = Error::MissingArtifact("message signature needs the artifact".into());
        assert_eq!(
            error.to_string(),
            "missing artifact: message signature needs the artifact"
        );
    }
}
