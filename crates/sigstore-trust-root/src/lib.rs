//! Sigstore trusted root parsing
//!
//! The trusted root holds the trust anchors verification is measured
//! against:
//! - certificate authorities (Fulcio), each with a validity window
//! - Certificate Transparency logs, keyed by log id
//! - transparency logs (Rekor), keyed by log id
//!
//! # Example
//!
//! ```no_run
//! use sigstore_trust_root::TrustedRoot;
//!
//! let root = TrustedRoot::from_file("trusted_root.json").unwrap();
//! println!("{} certificate authorities", root.certificate_authorities.len());
//! ```

pub mod error;
pub mod trusted_root;

pub use error::{Error, Result};
pub use trusted_root::{
    find_log, CertChain, CertificateAuthority, CertificateEntry, CertificateSubject, LogId,
    PublicKey, TransparencyLogInstance, TrustedRoot, ValidityPeriod, TRUSTED_ROOT_MEDIA_TYPE,
};
