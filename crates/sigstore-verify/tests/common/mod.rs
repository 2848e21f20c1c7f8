//! Generated trust material for end-to-end tests
//!
//! A self-signed CA stands in for Fulcio and issues code signing leaves,
//! either directly or through an intermediate. Test CT logs sign genuine
//! SCTs over each leaf's precertificate entry, which are then embedded into
//! the final certificate.

#![allow(dead_code)]

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use der::asn1::{OctetStringRef, Utf8StringRef};
use der::Encode;
use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, CustomExtension, DnType,
    ExtendedKeyUsagePurpose, IsCa, KeyPair, SanType, SerialNumber,
};
use serde_json::{json, Value};
use sigstore_verify::crypto::{sha256, Certificate};
use sigstore_verify::trust_root::{
    CertChain, CertificateAuthority, CertificateEntry, CertificateSubject, LogId,
    PublicKey as LogPublicKey, TransparencyLogInstance, TrustedRoot, ValidityPeriod,
    TRUSTED_ROOT_MEDIA_TYPE,
};
use sigstore_verify::types::{Bundle, ByteStream, DerCertificate, DerPublicKey, LogKeyId};
use sigstore_verify::Sct;

pub const SIGNER_EMAIL: &str = "signer@example.com";
pub const OIDC_ISSUER: &str = "https://issuer.example.com";
pub const KEY_HINT: &str = "release-key";

/// 2024-03-01T00:00:00Z in milliseconds, the issuance time of every leaf
pub const SCT_TIMESTAMP: u64 = 1_709_251_200_000;

const CT_PRECERT_SCTS: &[u64] = &[1, 3, 6, 1, 4, 1, 11129, 2, 4, 2];
const FULCIO_ISSUER_V2: &[u64] = &[1, 3, 6, 1, 4, 1, 57264, 1, 8];

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// An ECDSA P-256 key usable both by rcgen and for signing test data
pub struct SigningKey {
    pkcs8: Vec<u8>,
    key: EcdsaKeyPair,
}

impl SigningKey {
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
            .unwrap()
            .as_ref()
            .to_vec();
        let key = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &pkcs8).unwrap();
        Self { pkcs8, key }
    }

    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.key
            .sign(&SystemRandom::new(), data)
            .unwrap()
            .as_ref()
            .to_vec()
    }

    pub fn key_pair(&self) -> KeyPair {
        KeyPair::try_from(self.pkcs8.as_slice()).unwrap()
    }

    /// DER SubjectPublicKeyInfo
    pub fn spki(&self) -> Vec<u8> {
        self.key_pair().public_key_der()
    }

    pub fn public_key_pem(&self) -> String {
        self.key_pair().public_key_pem()
    }
}

/// A Certificate Transparency log that signs SCTs for precertificates
pub struct TestLog {
    key: SigningKey,
}

impl TestLog {
    pub fn new() -> Self {
        Self {
            key: SigningKey::generate(),
        }
    }

    pub fn id(&self) -> [u8; 32] {
        sha256(&self.key.spki())
    }

    pub fn instance(&self) -> TransparencyLogInstance {
        TransparencyLogInstance {
            base_url: format!("https://ct.example.com/{}", hex::encode(&self.id()[..4])),
            hash_algorithm: None,
            public_key: LogPublicKey {
                raw_bytes: Some(DerPublicKey::new(self.key.spki())),
                key_details: "PKIX_ECDSA_P256_SHA_256".to_string(),
                valid_for: Some(ValidityPeriod {
                    start: Some(at(2024, 1, 1)),
                    end: None,
                }),
            },
            log_id: LogId {
                key_id: LogKeyId::new(self.id().to_vec()),
            },
        }
    }

    /// Serialized SCT over `pre_cert`
    pub fn sign_sct(&self, pre_cert: &[u8]) -> Vec<u8> {
        let mut sct = Sct {
            version: 0,
            log_id: self.id(),
            timestamp: SCT_TIMESTAMP,
            extensions: Vec::new(),
            hash_algorithm: 4,
            signature_algorithm: 3,
            signature: Vec::new(),
        };
        sct.signature = self.key.sign(&sct.signed_data(pre_cert).unwrap());
        sct.encode().unwrap()
    }
}

/// A certificate authority, self-signed unless created by [`TestCa::intermediate`]
pub struct TestCa {
    cert: rcgen::Certificate,
    key: KeyPair,
}

impl TestCa {
    pub fn new(name: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let cert = ca_params(name).self_signed(&key).unwrap();
        Self { cert, key }
    }

    /// A subordinate CA issued by this one
    pub fn intermediate(&self, name: &str) -> TestCa {
        let key = KeyPair::generate().unwrap();
        let cert = ca_params(name)
            .signed_by(&key, &self.cert, &self.key)
            .unwrap();
        TestCa { cert, key }
    }

    pub fn der(&self) -> DerCertificate {
        DerCertificate::new(self.cert.der().to_vec())
    }

    /// Trusted root entry for this CA, valid from `start` onwards
    pub fn authority(&self, start: DateTime<Utc>) -> CertificateAuthority {
        chain_authority(&[self], start)
    }

    /// Issue a code signing leaf for `signer` carrying one SCT per log
    pub fn issue(&self, signer: &SigningKey, logs: &[&TestLog]) -> DerCertificate {
        self.issue_with_sct_issuer(signer, logs, self)
    }

    /// Issue a leaf whose SCTs are signed over `sct_issuer`'s key hash
    pub fn issue_with_sct_issuer(
        &self,
        signer: &SigningKey,
        logs: &[&TestLog],
        sct_issuer: &TestCa,
    ) -> DerCertificate {
        let plain = leaf_params()
            .signed_by(&signer.key_pair(), &self.cert, &self.key)
            .unwrap();
        if logs.is_empty() {
            return DerCertificate::new(plain.der().to_vec());
        }

        // Everything but the SCT list is deterministic, so the final leaf
        // has the same precertificate entry as the plain one
        let issuer = Certificate::from_der(sct_issuer.cert.der()).unwrap();
        let pre_cert = Certificate::from_der(plain.der())
            .unwrap()
            .precert_entry(&issuer)
            .unwrap();
        let scts: Vec<Vec<u8>> = logs.iter().map(|log| log.sign_sct(&pre_cert)).collect();

        let mut params = leaf_params();
        params.custom_extensions.push(sct_list_extension(&scts));
        let leaf = params
            .signed_by(&signer.key_pair(), &self.cert, &self.key)
            .unwrap();
        DerCertificate::new(leaf.der().to_vec())
    }
}

/// Trusted root entry publishing `chain`, issuing CA first
pub fn chain_authority(chain: &[&TestCa], start: DateTime<Utc>) -> CertificateAuthority {
    CertificateAuthority {
        subject: CertificateSubject::default(),
        uri: "https://fulcio.example.com".to_string(),
        cert_chain: CertChain {
            certificates: chain
                .iter()
                .map(|ca| CertificateEntry { raw_bytes: ca.der() })
                .collect(),
        },
        valid_for: Some(ValidityPeriod {
            start: Some(start),
            end: None,
        }),
    }
}

fn ca_params(name: &str) -> CertificateParams {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::OrganizationName, "example.com");
    params.distinguished_name.push(DnType::CommonName, name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params
}

fn leaf_params() -> CertificateParams {
    let mut params = CertificateParams::default();
    params.distinguished_name = rcgen::DistinguishedName::new();
    params.serial_number = Some(SerialNumber::from_slice(&[0x51, 0x6e, 0x01, 0x7a]));
    params.not_before = date_time_ymd(2024, 3, 1);
    params.not_after = date_time_ymd(2024, 3, 2);
    params.subject_alt_names = vec![SanType::Rfc822Name(SIGNER_EMAIL.try_into().unwrap())];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::CodeSigning];
    let issuer = Utf8StringRef::new(OIDC_ISSUER).unwrap().to_der().unwrap();
    params
        .custom_extensions
        .push(CustomExtension::from_oid_content(FULCIO_ISSUER_V2, issuer));
    params
}

fn sct_list_extension(scts: &[Vec<u8>]) -> CustomExtension {
    let mut body = ByteStream::new();
    for sct in scts {
        body.append_opaque16(sct).unwrap();
    }
    let mut list = ByteStream::new();
    list.append_opaque16(body.as_bytes()).unwrap();
    let value = OctetStringRef::new(list.as_bytes()).unwrap().to_der().unwrap();
    CustomExtension::from_oid_content(CT_PRECERT_SCTS, value)
}

/// Trusted root with the given certificate authorities and CT logs
pub fn trusted_root(authorities: Vec<CertificateAuthority>, logs: &[&TestLog]) -> TrustedRoot {
    TrustedRoot {
        media_type: TRUSTED_ROOT_MEDIA_TYPE.to_string(),
        tlogs: Vec::new(),
        certificate_authorities: authorities,
        ctlogs: logs.iter().map(|log| log.instance()).collect(),
    }
}

/// Verification material naming a certificate
pub fn certificate_material(leaf: &DerCertificate) -> Value {
    json!({"certificate": {"rawBytes": leaf.to_base64()}})
}

/// Verification material carrying a leaf-first certificate chain
pub fn chain_material(certs: &[DerCertificate]) -> Value {
    let certificates: Vec<Value> = certs
        .iter()
        .map(|cert| json!({"rawBytes": cert.to_base64()}))
        .collect();
    json!({"x509CertificateChain": {"certificates": certificates}})
}

/// Verification material naming a caller-held key
pub fn public_key_material(hint: &str) -> Value {
    json!({"publicKey": {"hint": hint}})
}

/// A detached signature over `artifact`, recording its SHA-256 digest
pub fn message_signature(artifact: &[u8], signature: &[u8]) -> Value {
    json!({
        "messageSignature": {
            "messageDigest": {
                "algorithm": "SHA2_256",
                "digest": STANDARD.encode(sha256(artifact)),
            },
            "signature": STANDARD.encode(signature),
        }
    })
}

/// A DSSE envelope with a single signature
pub fn dsse_envelope(payload_type: &str, payload: &[u8], signature: &[u8]) -> Value {
    json!({
        "dsseEnvelope": {
            "payloadType": payload_type,
            "payload": STANDARD.encode(payload),
            "signatures": [{"sig": STANDARD.encode(signature), "keyid": ""}],
        }
    })
}

/// A transparency log entry the default verifier has no key for
pub fn placeholder_tlog_entry(log_index: i64) -> Value {
    json!({
        "logIndex": log_index.to_string(),
        "logId": {"keyId": STANDARD.encode([0u8; 32])},
        "kindVersion": {"kind": "hashedrekord", "version": "0.0.1"},
        "integratedTime": "1709251260",
        "canonicalizedBody": STANDARD.encode(b"{}"),
    })
}

/// Assemble a v0.3 bundle from material, content and tlog entries
pub fn bundle(mut material: Value, content: Value, tlog_entries: Vec<Value>) -> Bundle {
    material["tlogEntries"] = Value::Array(tlog_entries);
    let mut json = json!({
        "mediaType": "application/vnd.dev.sigstore.bundle.v0.3+json",
        "verificationMaterial": material,
    });
    if let Value::Object(fields) = content {
        for (key, value) in fields {
            json[key] = value;
        }
    }
    Bundle::from_json(&json.to_string()).unwrap()
}

/// PAE of an envelope, for signing test payloads
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    sigstore_verify::types::pae(payload_type, payload)
}

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
