//! Cryptographic primitives for Sigstore verification
//!
//! This crate provides digests, public key parsing, signature verification
//! and X.509 certificate inspection, using aws-lc-rs as the cryptographic
//! backend and the RustCrypto `x509-cert`/`der` stack for ASN.1.

pub mod error;
pub mod hash;
pub mod verification;
pub mod x509;

pub use error::{Error, Result};
pub use hash::{digest, sha256, sha384, sha512};
pub use verification::{KeyAlgorithm, MessageHash, PublicKey, SigningScheme};
pub use x509::Certificate;
