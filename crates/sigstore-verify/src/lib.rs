//! Sigstore bundle verification
//!
//! Checks that a bundle was signed by a trusted signer:
//! - the signing certificate chains to a certificate authority that was
//!   valid when it was issued
//! - enough embedded Signed Certificate Timestamps verify against trusted
//!   Certificate Transparency logs
//! - the message signature or DSSE envelope verifies with the signer's key
//! - enough transparency log entries are accepted by the configured
//!   [`TlogVerifier`]
//!
//! Bundles signed with a caller-held key instead of a certificate resolve
//! their key through a [`KeySelector`].

pub mod error;
pub mod options;
pub mod verify;
pub mod verify_impl;

pub use sigstore_crypto as crypto;
pub use sigstore_trust_root as trust_root;
pub use sigstore_types as types;

pub use error::{Error, Result};
pub use options::{
    CertificateIdentity, CtlogOptions, SignerPolicy, TlogOptions, VerificationOptions,
    DEFAULT_CTLOG_THRESHOLD, DEFAULT_TLOG_THRESHOLD,
};
pub use verify::{VerificationResult, VerifiedSigner, Verifier};
pub use verify_impl::ca::{ChainBuilder, WebPkiChainBuilder};
pub use verify_impl::key::KeySelector;
pub use verify_impl::sct::Sct;
pub use verify_impl::tlog::{SignedEntryTimestampVerifier, TlogVerifier};
