//! Verification key resolution
//!
//! A bundle names its signer either with certificate material, whose leaf
//! key is used once the certificate is trusted, or with a public key hint
//! that the caller's [`KeySelector`] turns into key bytes.

use crate::error::{Error, Result};
use crate::options::SignerPolicy;
use sigstore_crypto::{Certificate, PublicKey};
use sigstore_types::{Bundle, DerCertificate};

/// Looks up caller-held keys by bundle hint
///
/// Returned bytes are a PEM or DER `SubjectPublicKeyInfo`.
pub trait KeySelector: Send + Sync {
    /// Key for `hint`, if the caller has one
    fn select(&self, hint: &str) -> Option<Vec<u8>>;
}

impl<F> KeySelector for F
where
    F: Fn(&str) -> Option<Vec<u8>> + Send + Sync,
{
    fn select(&self, hint: &str) -> Option<Vec<u8>> {
        self(hint)
    }
}

/// Where a resolved key came from
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Leaf of the bundle's certificate material
    Certificate {
        /// Parsed leaf certificate
        leaf: Certificate,
        /// Bundle certificates, leaf first
        certificates: Vec<DerCertificate>,
    },
    /// Key returned by the key selector
    PublicKey {
        /// Hint the bundle carried
        hint: String,
    },
}

/// The key a bundle's signature is checked with
#[derive(Debug, Clone)]
pub struct ResolvedKey {
    /// Verification key
    pub key: PublicKey,
    /// Where `key` came from
    pub source: KeySource,
}

impl ResolvedKey {
    /// Whether the key is only trustworthy once its certificate is verified
    pub fn requires_certificate_trust(&self) -> bool {
        matches!(self.source, KeySource::Certificate { .. })
    }
}

/// Resolve the verification key for `bundle` and apply the signers policy
pub fn resolve_key(
    bundle: &Bundle,
    selector: Option<&dyn KeySelector>,
    signers: Option<&SignerPolicy>,
) -> Result<ResolvedKey> {
    let resolved = match bundle.public_key_hint() {
        Some(hint) => select_key(hint, selector)?,
        None => certificate_key(bundle)?,
    };

    if let Some(policy) = signers {
        check_signer(policy, &resolved)?;
    }
    Ok(resolved)
}

fn select_key(hint: &str, selector: Option<&dyn KeySelector>) -> Result<ResolvedKey> {
    let selector = selector.ok_or_else(|| {
        Error::KeyNotFound(format!("no key selector configured for hint {hint:?}"))
    })?;
    let bytes = selector
        .select(hint)
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| Error::KeyNotFound(format!("no key for hint {hint:?}")))?;
    let key = PublicKey::parse(&bytes)
        .map_err(|e| Error::MalformedKey(format!("key for hint {hint:?}: {e}")))?;

    Ok(ResolvedKey {
        key,
        source: KeySource::PublicKey {
            hint: hint.to_string(),
        },
    })
}

fn certificate_key(bundle: &Bundle) -> Result<ResolvedKey> {
    let certificates = bundle.certificates().unwrap_or_default();
    let leaf_der = certificates.first().ok_or_else(|| {
        Error::MalformedCertificate("certificate chain is empty".to_string())
    })?;
    let leaf = Certificate::from_der(leaf_der.as_bytes())
        .map_err(|e| Error::MalformedCertificate(e.to_string()))?;
    let key = leaf
        .public_key()
        .map_err(|e| Error::MalformedKey(format!("signing certificate key: {e}")))?;

    Ok(ResolvedKey {
        key,
        source: KeySource::Certificate { leaf, certificates },
    })
}

fn check_signer(policy: &SignerPolicy, resolved: &ResolvedKey) -> Result<()> {
    match (policy, &resolved.source) {
        (SignerPolicy::PublicKeys(keys), KeySource::PublicKey { hint }) => {
            let spki = resolved.key.spki_der();
            if keys.iter().any(|allowed| allowed == spki) {
                Ok(())
            } else {
                Err(Error::UntrustedSigner(format!(
                    "key for hint {hint:?} is not an allowed signer"
                )))
            }
        }
        (SignerPolicy::CertificateIdentities(identities), KeySource::Certificate { leaf, .. }) => {
            let san = leaf
                .identity()
                .map_err(|e| Error::MalformedCertificate(e.to_string()))?;
            let issuer = leaf
                .oidc_issuer()
                .map_err(|e| Error::MalformedCertificate(e.to_string()))?;
            if identities
                .iter()
                .any(|identity| identity.matches(san.as_deref(), issuer.as_deref()))
            {
                Ok(())
            } else {
                Err(Error::UntrustedSigner(format!(
                    "certificate identity {san:?} from issuer {issuer:?} is not allowed"
                )))
            }
        }
        (SignerPolicy::PublicKeys(_), KeySource::Certificate { .. }) => {
            Err(Error::UntrustedSigner(
                "only public keys are allowed, bundle carries a certificate".to_string(),
            ))
        }
        (SignerPolicy::CertificateIdentities(_), KeySource::PublicKey { .. }) => {
            Err(Error::UntrustedSigner(
                "only certificate identities are allowed, bundle carries a public key".to_string(),
            ))
        }
    }
}
