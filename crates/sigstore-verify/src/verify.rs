//! High-level verification API
//!
//! This module provides the main entry point for verifying Sigstore bundles.

use crate::error::{Error, Result};
use crate::options::VerificationOptions;
use crate::verify_impl::ca::{ChainBuilder, WebPkiChainBuilder};
use crate::verify_impl::certificate::verify_signing_certificate;
use crate::verify_impl::key::{resolve_key, KeySelector, KeySource, ResolvedKey};
use crate::verify_impl::tlog::{verify_tlog_entries, TlogVerifier};
use sigstore_crypto::{MessageHash, PublicKey};
use sigstore_trust_root::TrustedRoot;
use sigstore_types::{
    Bundle, DerCertificate, DsseEnvelope, HashAlgorithm, MessageSignature, SignatureContent,
    Statement,
};

/// Who signed a verified bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifiedSigner {
    /// A certificate that chains to a trusted certificate authority
    Certificate {
        /// Validated chain, leaf first
        chain: Vec<DerCertificate>,
        /// Subject alternative name of the leaf (email or URI)
        identity: Option<String>,
        /// OIDC issuer recorded by the certificate authority
        issuer: Option<String>,
    },
    /// A key supplied by the key selector
    PublicKey {
        /// Hint the bundle carried
        hint: String,
    },
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// The signer
    pub signer: VerifiedSigner,
    /// SCTs that verified; `None` when CT checks were skipped or the signer
    /// is a public key
    pub verified_scts: Option<usize>,
    /// Transparency log entries that verified; `None` when tlog checks were
    /// skipped
    pub verified_tlog_entries: Option<usize>,
}

impl VerificationResult {
    /// Certificate identity of the signer, if it was a certificate
    pub fn identity(&self) -> Option<&str> {
        match &self.signer {
            VerifiedSigner::Certificate { identity, .. } => identity.as_deref(),
            VerifiedSigner::PublicKey { .. } => None,
        }
    }
}

/// A verifier for Sigstore bundles
///
/// Holds the trust material and the collaborators verification delegates
/// to. A `Verifier` is immutable once built and can be shared across threads.
pub struct Verifier {
    trusted_root: TrustedRoot,
    key_selector: Option<Box<dyn KeySelector>>,
    chain_builder: Box<dyn ChainBuilder>,
    tlog_verifier: Option<Box<dyn TlogVerifier>>,
}

impl Verifier {
    /// Create a new verifier with a trusted root
    ///
    /// Chains are built with [`WebPkiChainBuilder`]. No key selector and no
    /// transparency log verifier are configured; add them with the `with_*`
    /// methods.
    pub fn new(trusted_root: &TrustedRoot) -> Self {
        Self {
            trusted_root: trusted_root.clone(),
            key_selector: None,
            chain_builder: Box::new(WebPkiChainBuilder),
            tlog_verifier: None,
        }
    }

    /// Look up keys for `publicKey` bundles with `selector`
    pub fn with_key_selector(mut self, selector: impl KeySelector + 'static) -> Self {
        self.key_selector = Some(Box::new(selector));
        self
    }

    /// Build certificate chains with `builder`
    pub fn with_chain_builder(mut self, builder: impl ChainBuilder + 'static) -> Self {
        self.chain_builder = Box::new(builder);
        self
    }

    /// Check transparency log entries with `verifier`
    pub fn with_tlog_verifier(mut self, verifier: impl TlogVerifier + 'static) -> Self {
        self.tlog_verifier = Some(Box::new(verifier));
        self
    }

    /// Verify a bundle
    ///
    /// `artifact` is required for message signatures. For DSSE bundles it is
    /// optional; when given and the payload is an in-toto statement, one of
    /// the statement's subjects must carry the artifact's SHA-256 digest.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sigstore_verify::{VerificationOptions, Verifier};
    /// use sigstore_trust_root::TrustedRoot;
    /// use sigstore_types::Bundle;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let trusted_root = TrustedRoot::from_file("trusted_root.json")?;
    /// let bundle = Bundle::from_json(&std::fs::read_to_string("artifact.sigstore.json")?)?;
    /// let artifact = std::fs::read("artifact")?;
    ///
    /// let verifier = Verifier::new(&trusted_root);
    /// let options = VerificationOptions::default().skip_tlog();
    /// let result = verifier.verify(&bundle, &options, Some(artifact.as_slice()))?;
    /// println!("signed by {:?}", result.identity());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Verification proceeds in order and stops at the first failure:
    ///
    /// 1. Resolve the verification key from the bundle's material.
    /// 2. For certificate material, chain the leaf to a certificate
    ///    authority valid at issuance and check its embedded SCTs.
    /// 3. Verify the message signature or DSSE envelope with the key.
    /// 4. Count the transparency log entries the tlog verifier accepts.
    pub fn verify(
        &self,
        bundle: &Bundle,
        options: &VerificationOptions,
        artifact: Option<&[u8]>,
    ) -> Result<VerificationResult> {
        let resolved = resolve_key(
            bundle,
            self.key_selector.as_deref(),
            options.signers.as_ref(),
        )?;

        let (signer, verified_scts) = match &resolved.source {
            KeySource::Certificate { leaf, certificates } => {
                let verified = verify_signing_certificate(
                    certificates,
                    &self.trusted_root,
                    &options.ctlog_options,
                    &*self.chain_builder,
                )?;
                let identity = leaf
                    .identity()
                    .map_err(|e| Error::MalformedCertificate(e.to_string()))?;
                let issuer = leaf
                    .oidc_issuer()
                    .map_err(|e| Error::MalformedCertificate(e.to_string()))?;
                let signer = VerifiedSigner::Certificate {
                    chain: verified.chain,
                    identity,
                    issuer,
                };
                (signer, verified.verified_scts)
            }
            KeySource::PublicKey { hint } => {
                let signer = VerifiedSigner::PublicKey { hint: hint.clone() };
                (signer, None)
            }
        };

        match &bundle.content {
            SignatureContent::MessageSignature(signature) => {
                verify_message_signature(&resolved, signature, artifact)?
            }
            SignatureContent::DsseEnvelope(envelope) => {
                verify_dsse_envelope(&resolved.key, envelope, artifact)?
            }
        }

        let verified_tlog_entries = if options.tlog_options.disable {
            tracing::debug!("transparency log checks disabled");
            None
        } else {
            Some(verify_tlog_entries(
                self.tlog_verifier.as_deref(),
                bundle,
                &options.tlog_options,
            )?)
        };

        Ok(VerificationResult {
            signer,
            verified_scts,
            verified_tlog_entries,
        })
    }
}

fn message_hash(algorithm: HashAlgorithm) -> MessageHash {
    match algorithm {
        HashAlgorithm::Sha2256 => MessageHash::Sha256,
        HashAlgorithm::Sha2384 => MessageHash::Sha384,
        HashAlgorithm::Sha2512 => MessageHash::Sha512,
    }
}

fn verify_message_signature(
    resolved: &ResolvedKey,
    signature: &MessageSignature,
    artifact: Option<&[u8]>,
) -> Result<()> {
    let artifact = artifact.ok_or_else(|| {
        Error::MissingArtifact("message signature bundles need the signed artifact".to_string())
    })?;

    if let Some(expected) = &signature.message_digest {
        let actual = sigstore_crypto::digest(expected.algorithm, artifact);
        if actual.as_bytes() != expected.digest.as_bytes() {
            return Err(Error::SignatureMismatch(format!(
                "artifact {} digest {} does not match bundle digest {}",
                expected.algorithm,
                actual.to_hex(),
                expected.digest.to_hex()
            )));
        }
    }

    // The declared digest algorithm pins the signature hash where the key allows it
    let scheme = signature
        .message_digest
        .as_ref()
        .and_then(|d| resolved.key.scheme_for_hash(message_hash(d.algorithm)))
        .unwrap_or_else(|| resolved.key.default_scheme());

    resolved
        .key
        .verify_with_scheme(scheme, artifact, signature.signature.as_bytes())
        .map_err(|e| Error::SignatureMismatch(format!("message signature: {e}")))
}

fn verify_dsse_envelope(
    key: &PublicKey,
    envelope: &DsseEnvelope,
    artifact: Option<&[u8]>,
) -> Result<()> {
    let pae = envelope.pae();
    let any_valid = envelope
        .signatures
        .iter()
        .any(|sig| key.verify(&pae, sig.sig.as_bytes()).is_ok());
    if !any_valid {
        return Err(Error::SignatureMismatch(format!(
            "none of {} DSSE signatures verify",
            envelope.signatures.len()
        )));
    }

    let Some(artifact) = artifact else {
        return Ok(());
    };
    if !envelope.is_in_toto() {
        return Ok(());
    }

    let statement = Statement::from_slice(envelope.payload.as_bytes())
        .map_err(|e| Error::SignatureMismatch(format!("in-toto statement: {e}")))?;
    let artifact_hex = hex::encode(sigstore_crypto::sha256(artifact));
    if !statement.matches_sha256(&artifact_hex) {
        return Err(Error::SignatureMismatch(format!(
            "artifact sha256 {artifact_hex} is not a subject of the attestation"
        )));
    }
    Ok(())
}
