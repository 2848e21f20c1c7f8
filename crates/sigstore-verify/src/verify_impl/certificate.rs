//! Signing certificate verification
//!
//! Chains the bundle's leaf to a trusted certificate authority at the
//! leaf's issuance time, then counts the embedded SCTs that verify against
//! the trusted CT logs.

use crate::error::{Error, Result};
use crate::options::CtlogOptions;
use crate::verify_impl::ca::{verify_certificate_chain, ChainBuilder};
use crate::verify_impl::sct::Sct;
use sigstore_crypto::Certificate;
use sigstore_trust_root::{TransparencyLogInstance, TrustedRoot};
use sigstore_types::DerCertificate;

/// A signing certificate that chains to the trusted root
#[derive(Debug, Clone)]
pub struct VerifiedCertificate {
    /// The parsed leaf
    pub leaf: Certificate,
    /// Validated chain, leaf first
    pub chain: Vec<DerCertificate>,
    /// SCTs that verified, or `None` when CT checks were disabled
    pub verified_scts: Option<usize>,
}

/// Verify the bundle certificates (leaf first) against the trusted root
pub fn verify_signing_certificate(
    certs: &[DerCertificate],
    trusted_root: &TrustedRoot,
    ctlog_options: &CtlogOptions,
    builder: &dyn ChainBuilder,
) -> Result<VerifiedCertificate> {
    let leaf_der = certs.first().ok_or_else(|| {
        Error::MalformedCertificate("bundle carries no certificates".to_string())
    })?;
    let leaf = parse(leaf_der)?;
    let issued_at = leaf
        .not_before()
        .map_err(|e| Error::MalformedCertificate(e.to_string()))?;

    let chain = verify_certificate_chain(
        builder,
        certs,
        &trusted_root.certificate_authorities,
        issued_at,
    )?;

    if ctlog_options.disable {
        tracing::debug!("Certificate Transparency checks disabled");
        return Ok(VerifiedCertificate {
            leaf,
            chain,
            verified_scts: None,
        });
    }

    let issuer_der = chain.get(1).ok_or_else(|| {
        Error::MalformedCertificate("chain has no issuer for the signing certificate".to_string())
    })?;
    let issuer = parse(issuer_der)?;

    let verified = count_verified_scts(&leaf, &issuer, &trusted_root.ctlogs)?;
    if verified < ctlog_options.threshold {
        return Err(Error::InsufficientScts(format!(
            "{verified} SCTs verified, {} required",
            ctlog_options.threshold
        )));
    }

    Ok(VerifiedCertificate {
        leaf,
        chain,
        verified_scts: Some(verified),
    })
}

fn parse(der: &DerCertificate) -> Result<Certificate> {
    Certificate::from_der(der.as_bytes()).map_err(|e| Error::MalformedCertificate(e.to_string()))
}

fn count_verified_scts(
    leaf: &Certificate,
    issuer: &Certificate,
    logs: &[TransparencyLogInstance],
) -> Result<usize> {
    let embedded = leaf
        .embedded_scts()
        .map_err(|e| Error::MalformedInput(format!("embedded SCT list: {e}")))?;
    if embedded.is_empty() {
        return Ok(0);
    }

    let pre_cert = leaf
        .precert_entry(issuer)
        .map_err(|e| Error::MalformedCertificate(e.to_string()))?;

    let mut verified = 0;
    for raw in &embedded {
        if Sct::parse(raw)?.verify(&pre_cert, logs)? {
            verified += 1;
        }
    }
    tracing::debug!(verified, total = embedded.len(), "embedded SCTs checked");
    Ok(verified)
}
