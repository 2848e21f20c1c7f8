//! Trusted root types and parsing
//!
//! Mirrors the `dev.sigstore.trustedroot.v1.TrustedRoot` JSON document.
//! Everything here is read-only once loaded; verification borrows it.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sigstore_types::{DerCertificate, DerPublicKey, HashAlgorithm, LogKeyId};

/// Media type of trusted root documents
pub const TRUSTED_ROOT_MEDIA_TYPE: &str =
    "application/vnd.dev.sigstore.trustedroot+json;version=0.1";

fn default_media_type() -> String {
    TRUSTED_ROOT_MEDIA_TYPE.to_string()
}

/// A trusted root containing every trust anchor verification may use
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedRoot {
    /// Media type of the trusted root
    #[serde(default = "default_media_type")]
    pub media_type: String,

    /// Transparency logs (Rekor)
    #[serde(default)]
    pub tlogs: Vec<TransparencyLogInstance>,

    /// Certificate authorities (Fulcio), in the order they are tried
    #[serde(default)]
    pub certificate_authorities: Vec<CertificateAuthority>,

    /// Certificate Transparency logs
    #[serde(default)]
    pub ctlogs: Vec<TransparencyLogInstance>,
}

/// A transparency or Certificate Transparency log
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyLogInstance {
    /// Base URL of the log
    #[serde(default)]
    pub base_url: String,

    /// Hash algorithm of the log's Merkle tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<HashAlgorithm>,

    /// Public key the log signs with
    pub public_key: PublicKey,

    /// Log identifier
    pub log_id: LogId,
}

/// Log identifier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogId {
    /// SHA-256 of the log's DER public key
    pub key_id: LogKeyId,
}

/// A certificate authority (Fulcio instance)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthority {
    /// Subject information
    #[serde(default)]
    pub subject: CertificateSubject,

    /// URI of the CA
    #[serde(default)]
    pub uri: String,

    /// Certificate chain, as published by the CA
    pub cert_chain: CertChain,

    /// When this CA may have issued certificates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_for: Option<ValidityPeriod>,
}

impl CertificateAuthority {
    /// Whether this CA is usable for a certificate issued at `t`
    ///
    /// A CA without a validity window, or without a start, is never usable.
    pub fn is_valid_at(&self, t: DateTime<Utc>) -> bool {
        self.valid_for.as_ref().is_some_and(|v| v.contains(t))
    }

    /// The CA's certificates in published order
    pub fn certificates(&self) -> Vec<DerCertificate> {
        self.cert_chain
            .certificates
            .iter()
            .map(|c| c.raw_bytes.clone())
            .collect()
    }
}

/// Public key information
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    /// DER SubjectPublicKeyInfo; absent when the key is withheld
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_bytes: Option<DerPublicKey>,

    /// Key details, e.g. `PKIX_ECDSA_P256_SHA_256`
    #[serde(default)]
    pub key_details: String,

    /// When this key was authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_for: Option<ValidityPeriod>,
}

/// Subject information for a certificate authority
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSubject {
    /// Organization name
    #[serde(default)]
    pub organization: Option<String>,

    /// Common name
    #[serde(default)]
    pub common_name: Option<String>,
}

/// Certificate chain
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertChain {
    /// Certificates in the chain
    #[serde(default)]
    pub certificates: Vec<CertificateEntry>,
}

/// A certificate entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateEntry {
    /// Raw bytes of the certificate (DER-encoded)
    pub raw_bytes: DerCertificate,
}

/// Closed validity window `[start, end]`; a missing end is open-ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityPeriod {
    /// Start time (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    /// End time (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl ValidityPeriod {
    /// Whether `t` falls inside the window; no start means nothing does
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        match self.start {
            Some(start) => start <= t && self.end.map_or(true, |end| t <= end),
            None => false,
        }
    }
}

impl TrustedRoot {
    /// Parse a trusted root from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a trusted root from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Certificate Transparency log with the given key id
    pub fn ctlog(&self, key_id: &[u8]) -> Option<&TransparencyLogInstance> {
        find_log(&self.ctlogs, key_id)
    }

    /// Transparency log with the given key id
    pub fn tlog(&self, key_id: &[u8]) -> Option<&TransparencyLogInstance> {
        find_log(&self.tlogs, key_id)
    }
}

/// Log in `logs` whose id is `key_id`
pub fn find_log<'a>(
    logs: &'a [TransparencyLogInstance],
    key_id: &[u8],
) -> Option<&'a TransparencyLogInstance> {
    logs.iter().find(|log| log.log_id.key_id.as_bytes() == key_id)
}
