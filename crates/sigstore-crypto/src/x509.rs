//! X.509 certificate utilities for Sigstore
//!
//! [`Certificate`] wraps a parsed `x509_cert::Certificate` together with its
//! original DER and exposes what verification needs: validity bounds, the
//! subject key, Fulcio identity fields, and the Certificate Transparency
//! pieces (embedded SCT list and the RFC 6962 precertificate entry).

use crate::error::{Error, Result};
use crate::hash::sha256;
use crate::verification::PublicKey;
use chrono::{DateTime, Utc};
use const_oid::ObjectIdentifier;
use der::asn1::{OctetStringRef, Utf8StringRef};
use der::{Decode, Encode};
use sigstore_types::{ByteStream, DerCertificate};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::ext::Extension;
use x509_cert::time::Time;

/// Embedded SignedCertificateTimestampList (RFC 6962 section 3.3)
const CT_PRECERT_SCTS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.11129.2.4.2");

/// Fulcio OIDC issuer extension (v1, raw string): 1.3.6.1.4.1.57264.1.1
const FULCIO_ISSUER_V1_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.1");

/// Fulcio OIDC issuer extension (v2, DER UTF8String): 1.3.6.1.4.1.57264.1.8
const FULCIO_ISSUER_V2_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.57264.1.8");

/// A parsed certificate together with its DER encoding
#[derive(Debug, Clone)]
pub struct Certificate {
    der: DerCertificate,
    cert: x509_cert::Certificate,
}

impl Certificate {
    /// Parse a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let cert = x509_cert::Certificate::from_der(der)
            .map_err(|e| Error::InvalidCertificate(format!("failed to parse certificate: {e}")))?;
        Ok(Self {
            der: DerCertificate::from(der),
            cert,
        })
    }

    /// The DER this certificate was parsed from
    pub fn der(&self) -> &DerCertificate {
        &self.der
    }

    /// Start of the validity period
    pub fn not_before(&self) -> Result<DateTime<Utc>> {
        to_datetime(&self.cert.tbs_certificate.validity.not_before)
    }

    /// End of the validity period
    pub fn not_after(&self) -> Result<DateTime<Utc>> {
        to_datetime(&self.cert.tbs_certificate.validity.not_after)
    }

    /// Whether `issuer`'s subject name is this certificate's issuer name
    pub fn is_issued_by(&self, issuer: &Certificate) -> bool {
        self.cert.tbs_certificate.issuer == issuer.cert.tbs_certificate.subject
    }

    /// Whether subject and issuer names are identical
    pub fn is_self_issued(&self) -> bool {
        self.cert.tbs_certificate.issuer == self.cert.tbs_certificate.subject
    }

    /// DER `SubjectPublicKeyInfo`
    pub fn spki_der(&self) -> Result<Vec<u8>> {
        Ok(self.cert.tbs_certificate.subject_public_key_info.to_der()?)
    }

    /// The subject public key
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_spki(&self.cert.tbs_certificate.subject_public_key_info)
    }

    fn extension(&self, oid: &ObjectIdentifier) -> Option<&Extension> {
        self.cert
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| &ext.extn_id == oid)
    }

    /// First email or URI in the Subject Alternative Name extension
    pub fn identity(&self) -> Result<Option<String>> {
        let san: Option<(bool, SubjectAltName)> = self
            .cert
            .tbs_certificate
            .get()
            .map_err(|e| Error::InvalidCertificate(format!("failed to decode SAN: {e}")))?;

        let Some((_critical, san)) = san else {
            return Ok(None);
        };

        Ok(san.0.iter().find_map(|name| match name {
            GeneralName::Rfc822Name(email) => Some(email.to_string()),
            GeneralName::UniformResourceIdentifier(uri) => Some(uri.to_string()),
            _ => None,
        }))
    }

    /// OIDC issuer recorded by Fulcio, preferring the DER-encoded v2 extension
    pub fn oidc_issuer(&self) -> Result<Option<String>> {
        if let Some(ext) = self.extension(&FULCIO_ISSUER_V2_OID) {
            let value = Utf8StringRef::from_der(ext.extn_value.as_bytes())?;
            return Ok(Some(value.to_string()));
        }
        if let Some(ext) = self.extension(&FULCIO_ISSUER_V1_OID) {
            let value = std::str::from_utf8(ext.extn_value.as_bytes()).map_err(|_| {
                Error::InvalidCertificate("issuer extension is not UTF-8".to_string())
            })?;
            return Ok(Some(value.to_string()));
        }
        Ok(None)
    }

    /// Serialized SCTs from the embedded SignedCertificateTimestampList
    ///
    /// The extension value is an OCTET STRING wrapping a TLS vector:
    /// `u16 total_len` followed by `u16`-prefixed SCTs. Absent extension
    /// means no SCTs; a list whose lengths disagree is an error.
    pub fn embedded_scts(&self) -> Result<Vec<Vec<u8>>> {
        let Some(ext) = self.extension(&CT_PRECERT_SCTS) else {
            return Ok(Vec::new());
        };

        let list = OctetStringRef::from_der(ext.extn_value.as_bytes())?;
        let mut stream = ByteStream::from_bytes(list.as_bytes());
        let total = stream.get_u16()? as usize;
        if total != stream.remaining() {
            return Err(Error::InvalidCertificate(format!(
                "SCT list declares {total} bytes but {} follow",
                stream.remaining()
            )));
        }

        let mut scts = Vec::new();
        while !stream.is_exhausted() {
            scts.push(stream.get_opaque16()?);
        }
        Ok(scts)
    }

    /// RFC 6962 `PreCert` bytes that an embedded SCT signs over
    ///
    /// `issuer_key_hash (32) ∥ u24 length ∥ TBSCertificate`, where the TBS is
    /// this certificate's with the SCT list extension removed.
    pub fn precert_entry(&self, issuer: &Certificate) -> Result<Vec<u8>> {
        let mut tbs = self.cert.tbs_certificate.clone();
        tbs.extensions = tbs.extensions.and_then(|exts| {
            let kept: Vec<Extension> = exts
                .into_iter()
                .filter(|ext| ext.extn_id != CT_PRECERT_SCTS)
                .collect();
            (!kept.is_empty()).then_some(kept)
        });
        let tbs_der = tbs.to_der()?;

        let tbs_len = u32::try_from(tbs_der.len())
            .map_err(|_| Error::InvalidCertificate("TBS certificate too large".to_string()))?;

        let mut stream = ByteStream::new();
        stream.append_view(&sha256(&issuer.spki_der()?));
        stream.append_u24(tbs_len)?;
        stream.append_view(&tbs_der);
        Ok(stream.into_inner())
    }
}

fn to_datetime(time: &Time) -> Result<DateTime<Utc>> {
    let since_epoch = time.to_unix_duration();
    let secs = i64::try_from(since_epoch.as_secs())
        .map_err(|_| Error::InvalidCertificate("validity time out of range".to_string()))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::InvalidCertificate("validity time out of range".to_string()))
}
