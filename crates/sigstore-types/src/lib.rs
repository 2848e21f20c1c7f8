//! Core types and data structures for Sigstore verification
//!
//! This crate provides the data structures the verifier consumes: the bundle
//! format, DSSE envelopes and in-toto statements, base64 field wrappers, and
//! the big-endian [`ByteStream`] used for Certificate Transparency codecs.

pub mod bundle;
pub mod dsse;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod intoto;
pub mod stream;

pub use bundle::{
    Bundle, CertificateContent, InclusionPromise, InclusionProof, MessageDigest,
    MessageSignature, SignatureContent, TransparencyLogEntry, VerificationMaterial,
    VerificationMaterialContent,
};
pub use dsse::{pae, DsseEnvelope, DsseSignature};
pub use encoding::{
    CanonicalizedBody, DerCertificate, DerPublicKey, DigestBytes, LogKeyId, PayloadBytes,
    SignatureBytes, SignedTimestamp,
};
pub use error::{Error, Result};
pub use hash::HashAlgorithm;
pub use intoto::Statement;
pub use stream::ByteStream;
