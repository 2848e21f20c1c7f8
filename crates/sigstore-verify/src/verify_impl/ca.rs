//! Certificate authority selection and chain building
//!
//! A trusted root can carry several Fulcio instances, each valid for a
//! window of time. The signing certificate is checked against every CA that
//! was valid when it was issued, in trusted root order, and the first CA
//! that produces a chain wins.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use const_oid::db::rfc5912::ID_KP_CODE_SIGNING;
use rustls_pki_types::{CertificateDer, UnixTime};
use sigstore_crypto::Certificate;
use sigstore_trust_root::CertificateAuthority;
use sigstore_types::DerCertificate;
use std::time::Duration;
use webpki::{anchor_from_trusted_cert, EndEntityCert, KeyUsage, ALL_VERIFICATION_ALGS};

/// Builds and validates a certificate path
pub trait ChainBuilder: Send + Sync {
    /// Validate `certs` (leaf first, then any intermediates) against the
    /// `trusted` certificates at `valid_at`, returning the chain leaf first.
    fn build_chain(
        &self,
        trusted: &[DerCertificate],
        certs: &[DerCertificate],
        valid_at: DateTime<Utc>,
    ) -> std::result::Result<Vec<DerCertificate>, String>;
}

/// [`ChainBuilder`] backed by rustls-webpki, requiring the code signing EKU
#[derive(Debug, Clone, Copy, Default)]
pub struct WebPkiChainBuilder;

impl ChainBuilder for WebPkiChainBuilder {
    fn build_chain(
        &self,
        trusted: &[DerCertificate],
        certs: &[DerCertificate],
        valid_at: DateTime<Utc>,
    ) -> std::result::Result<Vec<DerCertificate>, String> {
        let (leaf, intermediates) = certs
            .split_first()
            .ok_or_else(|| "no certificates to validate".to_string())?;

        // Every CA certificate is a trust anchor, intermediates included
        let trust_anchors: Vec<_> = trusted
            .iter()
            .filter_map(|der| {
                let cert = CertificateDer::from(der.as_bytes());
                match anchor_from_trusted_cert(&cert) {
                    Ok(anchor) => Some(anchor.to_owned()),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unparseable CA certificate");
                        None
                    }
                }
            })
            .collect();
        if trust_anchors.is_empty() {
            return Err("no usable trust anchors".to_string());
        }

        let intermediate_certs: Vec<CertificateDer<'static>> = intermediates
            .iter()
            .map(|der| CertificateDer::from(der.as_bytes().to_vec()))
            .collect();

        let leaf_der = CertificateDer::from(leaf.as_bytes());
        let end_entity = EndEntityCert::try_from(&leaf_der)
            .map_err(|e| format!("failed to parse end-entity certificate: {e}"))?;

        let secs = u64::try_from(valid_at.timestamp())
            .map_err(|_| format!("validation time {valid_at} precedes the Unix epoch"))?;

        end_entity
            .verify_for_usage(
                ALL_VERIFICATION_ALGS,
                &trust_anchors,
                &intermediate_certs,
                UnixTime::since_unix_epoch(Duration::from_secs(secs)),
                KeyUsage::required(ID_KP_CODE_SIGNING.as_bytes()),
                None,
                None,
            )
            .map_err(|e| format!("certificate chain validation failed: {e}"))?;

        issuer_path(leaf, intermediates, trusted)
    }
}

/// Order an already validated path by walking issuer names from the leaf
fn issuer_path(
    leaf: &DerCertificate,
    intermediates: &[DerCertificate],
    trusted: &[DerCertificate],
) -> std::result::Result<Vec<DerCertificate>, String> {
    let pool: Vec<Certificate> = intermediates
        .iter()
        .chain(trusted)
        .filter_map(|der| Certificate::from_der(der.as_bytes()).ok())
        .collect();

    let mut current = Certificate::from_der(leaf.as_bytes()).map_err(|e| e.to_string())?;
    let mut chain = vec![leaf.clone()];
    while !current.is_self_issued() && chain.len() <= pool.len() {
        let Some(issuer) = pool.iter().find(|candidate| current.is_issued_by(candidate)) else {
            break;
        };
        chain.push(issuer.der().clone());
        current = issuer.clone();
    }
    Ok(chain)
}

/// Certificate authorities usable at `valid_at`, in input order
pub fn filter_certificate_authorities(
    authorities: &[CertificateAuthority],
    valid_at: DateTime<Utc>,
) -> Vec<&CertificateAuthority> {
    authorities
        .iter()
        .filter(|ca| ca.is_valid_at(valid_at))
        .collect()
}

/// Chain `certs` to the first certificate authority that accepts them
///
/// Candidates are the authorities valid at `valid_at`; each is tried once,
/// in order, and the builder is never called when there are none.
pub fn verify_certificate_chain(
    builder: &dyn ChainBuilder,
    certs: &[DerCertificate],
    authorities: &[CertificateAuthority],
    valid_at: DateTime<Utc>,
) -> Result<Vec<DerCertificate>> {
    let candidates = filter_certificate_authorities(authorities, valid_at);
    if candidates.is_empty() {
        return Err(Error::NoValidCertificateAuthorities(format!(
            "none of {} certificate authorities is valid at {valid_at}",
            authorities.len()
        )));
    }

    let mut failures = Vec::new();
    let chain = candidates.iter().find_map(|ca| {
        match builder.build_chain(&ca.certificates(), certs, valid_at) {
            Ok(chain) => {
                tracing::debug!(ca = %ca.uri, "certificate chain built");
                Some(chain)
            }
            Err(reason) => {
                tracing::debug!(ca = %ca.uri, %reason, "certificate authority rejected chain");
                failures.push(format!("{}: {reason}", ca.uri));
                None
            }
        }
    });

    chain.ok_or_else(|| Error::NoValidCertificateChain(failures.join("; ")))
}
