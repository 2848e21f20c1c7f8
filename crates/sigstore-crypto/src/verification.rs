//! Public keys and signature verification using aws-lc-rs
//!
//! Keys arrive as DER or PEM `SubjectPublicKeyInfo`. The algorithm OID (and
//! curve, for EC keys) decides which [`SigningScheme`]s the key can verify;
//! anything outside that set is rejected instead of guessed.

use crate::error::{Error, Result};
use aws_lc_rs::signature::{
    UnparsedPublicKey, VerificationAlgorithm, ECDSA_P256_SHA256_ASN1,
    ECDSA_P256_SHA384_ASN1, ECDSA_P384_SHA256_ASN1, ECDSA_P384_SHA384_ASN1,
    ECDSA_P521_SHA512_ASN1, ED25519, RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
    RSA_PKCS1_2048_8192_SHA256, RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
};
use const_oid::db::rfc5912::{
    ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1, SECP_521_R_1,
};
use const_oid::db::rfc8410::ID_ED_25519;
use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use sigstore_types::DerPublicKey;
use spki::SubjectPublicKeyInfoOwned;

const PEM_PUBLIC_KEY_TAG: &str = "PUBLIC KEY";

/// Key algorithm family, including the curve for EC keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// ECDSA over NIST P-256
    EcdsaP256,
    /// ECDSA over NIST P-384
    EcdsaP384,
    /// ECDSA over NIST P-521
    EcdsaP521,
    /// Ed25519
    Ed25519,
    /// RSA (any modulus aws-lc-rs accepts, 2048 to 8192 bits)
    Rsa,
}

/// Message hash used alongside a key when verifying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageHash {
    /// SHA-1, legacy RSA only
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

/// A concrete key/hash/padding combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningScheme {
    /// ECDSA P-256 with SHA-256
    EcdsaP256Sha256,
    /// ECDSA P-256 with SHA-384
    EcdsaP256Sha384,
    /// ECDSA P-384 with SHA-256
    EcdsaP384Sha256,
    /// ECDSA P-384 with SHA-384
    EcdsaP384Sha384,
    /// ECDSA P-521 with SHA-512
    EcdsaP521Sha512,
    /// Ed25519 (hash is intrinsic)
    Ed25519,
    /// RSA PKCS#1 v1.5 with SHA-1
    RsaPkcs1Sha1,
    /// RSA PKCS#1 v1.5 with SHA-256
    RsaPkcs1Sha256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RsaPkcs1Sha384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RsaPkcs1Sha512,
}

impl SigningScheme {
    fn algorithm(&self) -> &'static dyn VerificationAlgorithm {
        match self {
            SigningScheme::EcdsaP256Sha256 => &ECDSA_P256_SHA256_ASN1,
            SigningScheme::EcdsaP256Sha384 => &ECDSA_P256_SHA384_ASN1,
            SigningScheme::EcdsaP384Sha256 => &ECDSA_P384_SHA256_ASN1,
            SigningScheme::EcdsaP384Sha384 => &ECDSA_P384_SHA384_ASN1,
            SigningScheme::EcdsaP521Sha512 => &ECDSA_P521_SHA512_ASN1,
            SigningScheme::Ed25519 => &ED25519,
            SigningScheme::RsaPkcs1Sha1 => &RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
            SigningScheme::RsaPkcs1Sha256 => &RSA_PKCS1_2048_8192_SHA256,
            SigningScheme::RsaPkcs1Sha384 => &RSA_PKCS1_2048_8192_SHA384,
            SigningScheme::RsaPkcs1Sha512 => &RSA_PKCS1_2048_8192_SHA512,
        }
    }

    /// The key family this scheme verifies with
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        match self {
            SigningScheme::EcdsaP256Sha256 | SigningScheme::EcdsaP256Sha384 => {
                KeyAlgorithm::EcdsaP256
            }
            SigningScheme::EcdsaP384Sha256 | SigningScheme::EcdsaP384Sha384 => {
                KeyAlgorithm::EcdsaP384
            }
            SigningScheme::EcdsaP521Sha512 => KeyAlgorithm::EcdsaP521,
            SigningScheme::Ed25519 => KeyAlgorithm::Ed25519,
            SigningScheme::RsaPkcs1Sha1
            | SigningScheme::RsaPkcs1Sha256
            | SigningScheme::RsaPkcs1Sha384
            | SigningScheme::RsaPkcs1Sha512 => KeyAlgorithm::Rsa,
        }
    }
}

/// A parsed public key ready for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    spki: DerPublicKey,
    // subjectPublicKey contents: EC point, Ed25519 key or PKCS#1 RSAPublicKey
    key_bytes: Vec<u8>,
}

impl PublicKey {
    /// Parse a DER `SubjectPublicKeyInfo`
    pub fn from_spki_der(der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoOwned::from_der(der)
            .map_err(|e| Error::InvalidKeyFormat(format!("invalid SubjectPublicKeyInfo: {e}")))?;
        Self::from_spki(&spki)
    }

    /// Parse an already-decoded `SubjectPublicKeyInfo`
    pub fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let algorithm = key_algorithm(spki)?;
        let key_bytes = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| {
                Error::InvalidKeyFormat("subject public key has unused bits".to_string())
            })?
            .to_vec();
        if key_bytes.is_empty() {
            return Err(Error::InvalidKeyFormat("empty subject public key".to_string()));
        }
        Ok(Self {
            algorithm,
            spki: DerPublicKey::new(spki.to_der()?),
            key_bytes,
        })
    }

    /// Parse a PEM `PUBLIC KEY` block
    pub fn from_pem(pem_text: &str) -> Result<Self> {
        let block = pem::parse(pem_text)?;
        if block.tag() != PEM_PUBLIC_KEY_TAG {
            return Err(Error::InvalidKeyFormat(format!(
                "expected PEM tag {PEM_PUBLIC_KEY_TAG}, got {}",
                block.tag()
            )));
        }
        Self::from_spki_der(block.contents())
    }

    /// Parse PEM or DER, whichever the bytes look like
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let start = bytes
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(bytes.len());
        let trimmed = &bytes[start..];
        if trimmed.starts_with(b"-----BEGIN") {
            let text = std::str::from_utf8(trimmed)
                .map_err(|_| Error::InvalidKeyFormat("PEM is not valid UTF-8".to_string()))?;
            Self::from_pem(text)
        } else {
            Self::from_spki_der(bytes)
        }
    }

    /// The key family
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// DER `SubjectPublicKeyInfo` of this key
    pub fn spki_der(&self) -> &DerPublicKey {
        &self.spki
    }

    /// The scheme used when nothing else pins the hash
    pub fn default_scheme(&self) -> SigningScheme {
        match self.algorithm {
            KeyAlgorithm::EcdsaP256 => SigningScheme::EcdsaP256Sha256,
            KeyAlgorithm::EcdsaP384 => SigningScheme::EcdsaP384Sha384,
            KeyAlgorithm::EcdsaP521 => SigningScheme::EcdsaP521Sha512,
            KeyAlgorithm::Ed25519 => SigningScheme::Ed25519,
            KeyAlgorithm::Rsa => SigningScheme::RsaPkcs1Sha256,
        }
    }

    /// The PKCS#1 or ECDSA scheme pairing this key with `hash`, if the
    /// backend supports that combination
    pub fn scheme_for_hash(&self, hash: MessageHash) -> Option<SigningScheme> {
        match (self.algorithm, hash) {
            (KeyAlgorithm::EcdsaP256, MessageHash::Sha256) => Some(SigningScheme::EcdsaP256Sha256),
            (KeyAlgorithm::EcdsaP256, MessageHash::Sha384) => Some(SigningScheme::EcdsaP256Sha384),
            (KeyAlgorithm::EcdsaP384, MessageHash::Sha256) => Some(SigningScheme::EcdsaP384Sha256),
            (KeyAlgorithm::EcdsaP384, MessageHash::Sha384) => Some(SigningScheme::EcdsaP384Sha384),
            (KeyAlgorithm::EcdsaP521, MessageHash::Sha512) => Some(SigningScheme::EcdsaP521Sha512),
            (KeyAlgorithm::Ed25519, _) => Some(SigningScheme::Ed25519),
            (KeyAlgorithm::Rsa, MessageHash::Sha1) => Some(SigningScheme::RsaPkcs1Sha1),
            (KeyAlgorithm::Rsa, MessageHash::Sha256) => Some(SigningScheme::RsaPkcs1Sha256),
            (KeyAlgorithm::Rsa, MessageHash::Sha384) => Some(SigningScheme::RsaPkcs1Sha384),
            (KeyAlgorithm::Rsa, MessageHash::Sha512) => Some(SigningScheme::RsaPkcs1Sha512),
            _ => None,
        }
    }

    /// Verify with the key's default scheme
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        self.verify_with_scheme(self.default_scheme(), data, signature)
    }

    /// Verify with an explicit scheme, which must match the key family
    pub fn verify_with_scheme(
        &self,
        scheme: SigningScheme,
        data: &[u8],
        signature: &[u8],
    ) -> Result<()> {
        if scheme.key_algorithm() != self.algorithm {
            return Err(Error::UnsupportedAlgorithm(format!(
                "{scheme:?} cannot be used with a {:?} key",
                self.algorithm
            )));
        }
        UnparsedPublicKey::new(scheme.algorithm(), &self.key_bytes)
            .verify(data, signature)
            .map_err(|_| Error::Verification(format!("{scheme:?} signature invalid")))
    }
}

fn key_algorithm(spki: &SubjectPublicKeyInfoOwned) -> Result<KeyAlgorithm> {
    let alg_oid = spki.algorithm.oid;

    if alg_oid == ID_EC_PUBLIC_KEY {
        let params = spki.algorithm.parameters.as_ref().ok_or_else(|| {
            Error::InvalidKeyFormat("EC key missing curve parameters".to_string())
        })?;
        let curve_oid = params.decode_as::<ObjectIdentifier>().map_err(|e| {
            Error::InvalidKeyFormat(format!("failed to decode EC curve OID: {e}"))
        })?;
        return match curve_oid {
            oid if oid == SECP_256_R_1 => Ok(KeyAlgorithm::EcdsaP256),
            oid if oid == SECP_384_R_1 => Ok(KeyAlgorithm::EcdsaP384),
            oid if oid == SECP_521_R_1 => Ok(KeyAlgorithm::EcdsaP521),
            other => Err(Error::UnsupportedAlgorithm(format!("EC curve {other}"))),
        };
    }
    if alg_oid == RSA_ENCRYPTION {
        return Ok(KeyAlgorithm::Rsa);
    }
    if alg_oid == ID_ED_25519 {
        return Ok(KeyAlgorithm::Ed25519);
    }

    tracing::debug!("rejecting public key with algorithm {}", alg_oid);
    Err(Error::UnsupportedAlgorithm(format!("public key algorithm {alg_oid}")))
}
