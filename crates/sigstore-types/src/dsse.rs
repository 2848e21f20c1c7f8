//! Dead Simple Signing Envelope (DSSE) types
//!
//! DSSE is a signature envelope format used for signing arbitrary payloads.
//! Specification: https://github.com/secure-systems-lab/dsse

use crate::encoding::{PayloadBytes, SignatureBytes};
use serde::{Deserialize, Serialize};

/// Payload type of in-toto statements
pub const IN_TOTO_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// A DSSE envelope containing a signed payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsseEnvelope {
    /// Type URI of the payload
    pub payload_type: String,
    /// Decoded payload (base64 in JSON)
    pub payload: PayloadBytes,
    /// Signatures over the PAE (Pre-Authentication Encoding)
    pub signatures: Vec<DsseSignature>,
}

/// A signature in a DSSE envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsseSignature {
    /// Key ID (optional hint for key lookup)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyid: String,
    /// Decoded signature (base64 in JSON)
    pub sig: SignatureBytes,
}

impl DsseEnvelope {
    /// Create a new DSSE envelope
    pub fn new(
        payload_type: impl Into<String>,
        payload: impl Into<PayloadBytes>,
        signatures: Vec<DsseSignature>,
    ) -> Self {
        Self {
            payload_type: payload_type.into(),
            payload: payload.into(),
            signatures,
        }
    }

    /// The bytes every envelope signature is computed over
    pub fn pae(&self) -> Vec<u8> {
        pae(&self.payload_type, self.payload.as_bytes())
    }

    /// Whether the payload is an in-toto statement
    pub fn is_in_toto(&self) -> bool {
        self.payload_type == IN_TOTO_PAYLOAD_TYPE
    }
}

/// Compute the Pre-Authentication Encoding (PAE)
///
/// Format: `DSSEv1 <len(type)> <type> <len(body)> <body>`, lengths in ASCII
/// decimal, single spaces between fields.
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let header = format!(
        "DSSEv1 {} {} {} ",
        payload_type.len(),
        payload_type,
        payload.len()
    );
    let mut result = Vec::with_capacity(header.len() + payload.len());
    result.extend_from_slice(header.as_bytes());
    result.extend_from_slice(payload);
    result
}
