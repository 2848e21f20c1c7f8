//! Certificate Transparency SCT (Signed Certificate Timestamp) verification
//!
//! SCTs are embedded in Fulcio certificates as proof that the precertificate
//! was submitted to a CT log (RFC 6962). This module decodes the TLS wire
//! form of a single SCT, rebuilds the structure the log signed and checks
//! the log's signature over it.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sigstore_crypto::{MessageHash, PublicKey};
use sigstore_trust_root::{find_log, TransparencyLogInstance};
use sigstore_types::ByteStream;

/// Length of an SCT log id (SHA-256 of the log key)
pub const SCT_LOG_ID_LEN: usize = 32;

// RFC 6962 SignatureType::certificate_timestamp
const SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP: u8 = 0;

// RFC 6962 LogEntryType::precert_entry
const LOG_ENTRY_TYPE_PRECERT: u16 = 1;

/// TLS `HashAlgorithm` (RFC 5246 section 7.4.1.4.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SctHashAlgorithm {
    None,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    /// Any code RFC 5246 does not assign
    Unknown(u8),
}

impl From<u8> for SctHashAlgorithm {
    fn from(code: u8) -> Self {
        match code {
            0 => SctHashAlgorithm::None,
            1 => SctHashAlgorithm::Md5,
            2 => SctHashAlgorithm::Sha1,
            3 => SctHashAlgorithm::Sha224,
            4 => SctHashAlgorithm::Sha256,
            5 => SctHashAlgorithm::Sha384,
            6 => SctHashAlgorithm::Sha512,
            other => SctHashAlgorithm::Unknown(other),
        }
    }
}

impl SctHashAlgorithm {
    /// The hash to verify with, if the backend can verify with it at all
    pub fn message_hash(self) -> Option<MessageHash> {
        match self {
            SctHashAlgorithm::Sha1 => Some(MessageHash::Sha1),
            SctHashAlgorithm::Sha256 => Some(MessageHash::Sha256),
            SctHashAlgorithm::Sha384 => Some(MessageHash::Sha384),
            SctHashAlgorithm::Sha512 => Some(MessageHash::Sha512),
            _ => None,
        }
    }
}

/// A single decoded Signed Certificate Timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sct {
    /// SCT version; only v1 (0) is defined
    pub version: u8,
    /// SHA-256 of the issuing log's public key
    pub log_id: [u8; SCT_LOG_ID_LEN],
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Opaque CT extensions
    pub extensions: Vec<u8>,
    /// TLS hash algorithm code
    pub hash_algorithm: u8,
    /// TLS signature algorithm code
    pub signature_algorithm: u8,
    /// Signature over [`Sct::signed_data`]
    pub signature: Vec<u8>,
}

impl Sct {
    /// Decode one serialized SCT, which must span all of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut stream = ByteStream::from_bytes(bytes);
        let sct = Self::read(&mut stream)
            .map_err(|e| Error::MalformedInput(format!("truncated SCT: {e}")))?;
        if !stream.is_exhausted() {
            return Err(Error::MalformedInput(format!(
                "{} trailing bytes after SCT",
                stream.remaining()
            )));
        }
        Ok(sct)
    }

    fn read(stream: &mut ByteStream) -> sigstore_types::Result<Self> {
        let version = stream.get_u8()?;
        let mut log_id = [0u8; SCT_LOG_ID_LEN];
        log_id.copy_from_slice(&stream.get_block(SCT_LOG_ID_LEN)?);
        let timestamp = stream.get_u64()?;
        let extensions = stream.get_opaque16()?;
        let hash_algorithm = stream.get_u8()?;
        let signature_algorithm = stream.get_u8()?;
        let signature = stream.get_opaque16()?;

        Ok(Self {
            version,
            log_id,
            timestamp,
            extensions,
            hash_algorithm,
            signature_algorithm,
            signature,
        })
    }

    /// Serialize in the layout [`Sct::parse`] reads
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut stream = ByteStream::new();
        stream.append_char(self.version);
        stream.append_view(&self.log_id);
        stream.append_u64(self.timestamp);
        stream
            .append_opaque16(&self.extensions)
            .map_err(|e| Error::MalformedInput(format!("SCT extensions: {e}")))?;
        stream.append_char(self.hash_algorithm);
        stream.append_char(self.signature_algorithm);
        stream
            .append_opaque16(&self.signature)
            .map_err(|e| Error::MalformedInput(format!("SCT signature: {e}")))?;
        Ok(stream.into_inner())
    }

    /// The timestamp as a date, if it is representable
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// The hash algorithm code, decoded
    pub fn hash_algorithm(&self) -> SctHashAlgorithm {
        SctHashAlgorithm::from(self.hash_algorithm)
    }

    /// The `digitally-signed` struct the log signed for a precertificate
    ///
    /// `version ∥ signature_type ∥ timestamp ∥ entry_type ∥ pre_cert ∥
    /// u16 extensions length ∥ extensions`
    pub fn signed_data(&self, pre_cert: &[u8]) -> Result<Vec<u8>> {
        let mut stream = ByteStream::new();
        stream.append_char(self.version);
        stream.append_char(SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP);
        stream.append_u64(self.timestamp);
        stream.append_u16(LOG_ENTRY_TYPE_PRECERT);
        stream.append_view(pre_cert);
        stream
            .append_opaque16(&self.extensions)
            .map_err(|e| Error::MalformedInput(format!("SCT extensions: {e}")))?;
        Ok(stream.into_inner())
    }

    /// Check the log's signature over `pre_cert`
    ///
    /// Fails with [`Error::UnknownLog`] when no log in `logs` carries this
    /// SCT's log id with key material. A signature that does not verify, a
    /// key the log cannot use, an unusable hash code, or a timestamp outside
    /// the log key's validity window all yield `Ok(false)`.
    pub fn verify(&self, pre_cert: &[u8], logs: &[TransparencyLogInstance]) -> Result<bool> {
        let log_id = hex::encode(self.log_id);
        let log = find_log(logs, &self.log_id)
            .ok_or_else(|| Error::UnknownLog(format!("no CT log with id {log_id}")))?;
        let raw_key = log.public_key.raw_bytes.as_ref().ok_or_else(|| {
            Error::UnknownLog(format!("CT log {log_id} has no public key"))
        })?;

        if let Some(window) = &log.public_key.valid_for {
            let in_window = self.datetime().is_some_and(|t| window.contains(t));
            if !in_window {
                tracing::debug!(
                    log_id = %log_id,
                    timestamp = self.timestamp,
                    "SCT outside log key validity"
                );
                return Ok(false);
            }
        }

        let Some(hash) = self.hash_algorithm().message_hash() else {
            tracing::debug!(
                log_id = %log_id,
                code = self.hash_algorithm,
                "SCT hash algorithm unusable"
            );
            return Ok(false);
        };

        let key = match PublicKey::from_spki_der(raw_key.as_bytes()) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(log_id = %log_id, error = %e, "CT log key unusable");
                return Ok(false);
            }
        };
        let Some(scheme) = key.scheme_for_hash(hash) else {
            tracing::debug!(log_id = %log_id, ?hash, "CT log key does not support SCT hash");
            return Ok(false);
        };

        let payload = self.signed_data(pre_cert)?;
        let verified = key
            .verify_with_scheme(scheme, &payload, &self.signature)
            .is_ok();
        tracing::debug!(log_id = %log_id, verified, "SCT signature checked");
        Ok(verified)
    }
}
