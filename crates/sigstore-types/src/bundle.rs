//! Sigstore bundle format types
//!
//! The bundle is what verification consumes: a message signature or DSSE
//! envelope, the material that identifies the signer (certificate, chain or
//! public key hint) and any transparency log entries.

use crate::dsse::DsseEnvelope;
use crate::encoding::{
    string_i64, CanonicalizedBody, DerCertificate, DigestBytes, LogKeyId, SignatureBytes,
    SignedTimestamp,
};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};

/// Media type assumed for bundles that predate the `mediaType` field
pub const DEFAULT_MEDIA_TYPE: &str = "application/vnd.dev.sigstore.bundle+json;version=0.1";

fn default_media_type() -> String {
    DEFAULT_MEDIA_TYPE.to_string()
}

/// The main Sigstore bundle structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Media type identifying the bundle version
    #[serde(default = "default_media_type")]
    pub media_type: String,
    /// Verification material (certificate, chain or public key)
    pub verification_material: VerificationMaterial,
    /// The signed content
    #[serde(flatten)]
    pub content: SignatureContent,
}

impl Bundle {
    /// Parse a bundle from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Json)
    }

    /// Serialize the bundle to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Json)
    }

    /// Bundle certificates, leaf first, or `None` for public-key bundles
    pub fn certificates(&self) -> Option<Vec<DerCertificate>> {
        match &self.verification_material.content {
            VerificationMaterialContent::Certificate(cert) => Some(vec![cert.raw_bytes.clone()]),
            VerificationMaterialContent::X509CertificateChain { certificates } => Some(
                certificates
                    .iter()
                    .map(|c| c.raw_bytes.clone())
                    .collect(),
            ),
            VerificationMaterialContent::PublicKey { .. } => None,
        }
    }

    /// The public key hint, for bundles signed with a caller-held key
    pub fn public_key_hint(&self) -> Option<&str> {
        match &self.verification_material.content {
            VerificationMaterialContent::PublicKey { hint } => Some(hint),
            _ => None,
        }
    }
}

/// The signature content (either a message signature or DSSE envelope)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureContent {
    /// A detached signature over the artifact bytes
    MessageSignature(MessageSignature),
    /// A DSSE envelope
    DsseEnvelope(DsseEnvelope),
}

/// A detached signature over an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSignature {
    /// Digest of the signed artifact, when the signer recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_digest: Option<MessageDigest>,
    /// The signature bytes
    pub signature: SignatureBytes,
}

/// Message digest with algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDigest {
    /// Hash algorithm
    pub algorithm: HashAlgorithm,
    /// Digest bytes
    pub digest: DigestBytes,
}

/// Verification material containing certificate/key and log entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMaterial {
    /// Certificate, certificate chain, or public key hint
    #[serde(flatten)]
    pub content: VerificationMaterialContent,
    /// Transparency log entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tlog_entries: Vec<TransparencyLogEntry>,
}

/// The verification material content type
///
/// The JSON field name selects the variant:
/// - "certificate" -> Certificate (v0.3)
/// - "x509CertificateChain" -> X509CertificateChain (v0.1/v0.2)
/// - "publicKey" -> PublicKey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationMaterialContent {
    /// Single leaf certificate
    Certificate(CertificateContent),
    /// Certificate chain, leaf first
    X509CertificateChain {
        /// Chain of certificates
        certificates: Vec<CertificateContent>,
    },
    /// A key held by the verifier, identified by a hint
    PublicKey {
        /// Public key hint
        #[serde(default)]
        hint: String,
    },
}

/// A DER certificate as carried in verification material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateContent {
    /// DER-encoded certificate
    pub raw_bytes: DerCertificate,
}

/// A transparency log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLogEntry {
    /// Log index
    #[serde(with = "string_i64")]
    pub log_index: i64,
    /// Log ID
    pub log_id: LogId,
    /// Kind and version of the entry
    pub kind_version: KindVersion,
    /// Integrated time (Unix seconds); absent on some log versions
    #[serde(default, with = "string_i64")]
    pub integrated_time: i64,
    /// Inclusion promise (Signed Entry Timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_promise: Option<InclusionPromise>,
    /// Inclusion proof
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_proof: Option<InclusionProof>,
    /// Canonicalized body
    pub canonicalized_body: CanonicalizedBody,
}

/// Log identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogId {
    /// SHA-256 of the log's public key
    pub key_id: LogKeyId,
}

/// Entry kind and version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindVersion {
    /// Entry kind (e.g., "hashedrekord")
    pub kind: String,
    /// Entry version (e.g., "0.0.1")
    pub version: String,
}

/// Inclusion promise (Signed Entry Timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionPromise {
    /// Signed entry timestamp
    pub signed_entry_timestamp: SignedTimestamp,
}

/// Inclusion proof in the log's Merkle tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionProof {
    /// Index of the entry in the tree
    #[serde(with = "string_i64")]
    pub log_index: i64,
    /// Root hash of the tree
    pub root_hash: DigestBytes,
    /// Tree size at time of proof
    #[serde(with = "string_i64")]
    pub tree_size: i64,
    /// Audit path hashes
    #[serde(default)]
    pub hashes: Vec<DigestBytes>,
    /// Signed checkpoint text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<Checkpoint>,
}

/// Checkpoint (signed tree head) envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Note-formatted checkpoint text
    #[serde(default)]
    pub envelope: String,
}
