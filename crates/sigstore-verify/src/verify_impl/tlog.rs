//! Transparency log verification
//!
//! Inclusion proofs, checkpoints and online lookups are delegated to a
//! [`TlogVerifier`]. The orchestrator only counts how many of a bundle's
//! entries the verifier accepts. [`SignedEntryTimestampVerifier`] is an
//! offline verifier that checks each entry's inclusion promise.

use crate::error::{Error, Result};
use crate::options::TlogOptions;
use serde::Serialize;
use sigstore_crypto::{Certificate, PublicKey};
use sigstore_trust_root::{find_log, TransparencyLogInstance, TrustedRoot};
use sigstore_types::{Bundle, TransparencyLogEntry};

/// Checks a single transparency log entry
pub trait TlogVerifier: Send + Sync {
    /// Accept or reject `entry`; `online` asks for confirmation against the
    /// live log
    fn verify_entry(
        &self,
        entry: &TransparencyLogEntry,
        bundle: &Bundle,
        online: bool,
    ) -> std::result::Result<(), String>;
}

/// Count the bundle's entries `verifier` accepts and enforce the threshold
pub fn verify_tlog_entries(
    verifier: Option<&dyn TlogVerifier>,
    bundle: &Bundle,
    options: &TlogOptions,
) -> Result<usize> {
    let verifier = verifier.ok_or_else(|| {
        Error::TlogVerifierUnavailable(
            "transparency log checks are enabled but no verifier is configured".to_string(),
        )
    })?;

    let mut verified = 0;
    for entry in &bundle.verification_material.tlog_entries {
        match verifier.verify_entry(entry, bundle, options.perform_online_verification) {
            Ok(()) => verified += 1,
            Err(reason) => {
                tracing::debug!(log_index = entry.log_index, %reason, "tlog entry rejected")
            }
        }
    }

    if verified < options.threshold {
        return Err(Error::InsufficientTlogEntries(format!(
            "{verified} of {} entries verified, {} required",
            bundle.verification_material.tlog_entries.len(),
            options.threshold
        )));
    }
    Ok(verified)
}

/// Offline [`TlogVerifier`] for Rekor v1 inclusion promises
///
/// An entry is accepted when its Signed Entry Timestamp verifies under a
/// key from the trusted root's `tlogs` and, for certificate bundles, its
/// integrated time falls within the leaf's validity.
#[derive(Debug, Clone)]
pub struct SignedEntryTimestampVerifier {
    logs: Vec<TransparencyLogInstance>,
}

/// Canonical JSON the log signs; field order is the sorted key order
#[derive(Serialize)]
struct RekorPayload<'a> {
    body: String,
    #[serde(rename = "integratedTime")]
    integrated_time: i64,
    #[serde(rename = "logID")]
    log_id: &'a str,
    #[serde(rename = "logIndex")]
    log_index: i64,
}

impl SignedEntryTimestampVerifier {
    /// Verifier using the transparency logs of `trusted_root`
    pub fn new(trusted_root: &TrustedRoot) -> Self {
        Self {
            logs: trusted_root.tlogs.clone(),
        }
    }

    fn log_key(&self, entry: &TransparencyLogEntry) -> std::result::Result<PublicKey, String> {
        let key_id = entry.log_id.key_id.as_bytes();
        let log = find_log(&self.logs, key_id)
            .ok_or_else(|| format!("unknown log id {}", hex::encode(key_id)))?;
        let raw = log
            .public_key
            .raw_bytes
            .as_ref()
            .ok_or_else(|| format!("log {} has no public key", log.base_url))?;
        PublicKey::from_spki_der(raw.as_bytes()).map_err(|e| format!("log key unusable: {e}"))
    }
}

impl TlogVerifier for SignedEntryTimestampVerifier {
    fn verify_entry(
        &self,
        entry: &TransparencyLogEntry,
        bundle: &Bundle,
        online: bool,
    ) -> std::result::Result<(), String> {
        if online {
            return Err("online verification is not supported offline".to_string());
        }
        let promise = entry
            .inclusion_promise
            .as_ref()
            .ok_or_else(|| "missing inclusion promise".to_string())?;
        let key = self.log_key(entry)?;

        let log_id = hex::encode(entry.log_id.key_id.as_bytes());
        let payload = RekorPayload {
            body: entry.canonicalized_body.to_base64(),
            integrated_time: entry.integrated_time,
            log_id: &log_id,
            log_index: entry.log_index,
        };
        let canonical = serde_json_canonicalizer::to_vec(&payload)
            .map_err(|e| format!("canonicalization failed: {e}"))?;

        key.verify(&canonical, promise.signed_entry_timestamp.as_bytes())
            .map_err(|e| format!("SET verification failed: {e}"))?;

        if let Some(leaf) = bundle.certificates().as_deref().and_then(<[_]>::first) {
            check_integrated_time(entry.integrated_time, leaf.as_bytes())?;
        }
        Ok(())
    }
}

fn check_integrated_time(integrated_time: i64, leaf_der: &[u8]) -> std::result::Result<(), String> {
    let leaf = Certificate::from_der(leaf_der).map_err(|e| e.to_string())?;
    let not_before = leaf.not_before().map_err(|e| e.to_string())?.timestamp();
    let not_after = leaf.not_after().map_err(|e| e.to_string())?.timestamp();
    if integrated_time < not_before || integrated_time > not_after {
        return Err(format!(
            "integrated time {integrated_time} outside certificate validity [{not_before}, {not_after}]"
        ));
    }
    Ok(())
}
