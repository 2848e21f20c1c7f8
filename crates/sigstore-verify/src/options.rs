//! Per-call verification options
//!
//! Options deserialize from camelCase JSON so they can be shipped next to a
//! trusted root; anything left out takes the documented default.

use serde::{Deserialize, Serialize};
use sigstore_types::DerPublicKey;

/// SCTs that must verify unless CT checks are disabled
pub const DEFAULT_CTLOG_THRESHOLD: usize = 1;

/// Transparency log entries that must verify unless tlog checks are disabled
pub const DEFAULT_TLOG_THRESHOLD: usize = 1;

/// Options for a single verification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationOptions {
    /// Certificate Transparency requirements
    pub ctlog_options: CtlogOptions,
    /// Transparency log requirements
    pub tlog_options: TlogOptions,
    /// Restricts which signers are accepted; `None` accepts any trusted signer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signers: Option<SignerPolicy>,
}

/// Certificate Transparency requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CtlogOptions {
    /// Skip SCT verification entirely
    pub disable: bool,
    /// Minimum number of verified SCTs
    pub threshold: usize,
}

impl Default for CtlogOptions {
    fn default() -> Self {
        Self {
            disable: false,
            threshold: DEFAULT_CTLOG_THRESHOLD,
        }
    }
}

/// Transparency log requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TlogOptions {
    /// Skip transparency log verification entirely
    pub disable: bool,
    /// Minimum number of verified log entries
    pub threshold: usize,
    /// Ask the log verifier to confirm entries against the live log
    pub perform_online_verification: bool,
}

impl Default for TlogOptions {
    fn default() -> Self {
        Self {
            disable: false,
            threshold: DEFAULT_TLOG_THRESHOLD,
            perform_online_verification: false,
        }
    }
}

/// Which signers a bundle may come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignerPolicy {
    /// Bundle must be signed by one of these keys (DER SPKI)
    PublicKeys(Vec<DerPublicKey>),
    /// Bundle certificate must carry one of these identities
    CertificateIdentities(Vec<CertificateIdentity>),
}

/// Identity expected in a signing certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateIdentity {
    /// Subject alternative name (email or URI)
    pub san: String,
    /// OIDC issuer recorded by the CA, when it must be pinned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl CertificateIdentity {
    /// Identity with a pinned OIDC issuer
    pub fn new(san: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            san: san.into(),
            issuer: Some(issuer.into()),
        }
    }

    /// Identity accepted from any issuer
    pub fn any_issuer(san: impl Into<String>) -> Self {
        Self {
            san: san.into(),
            issuer: None,
        }
    }

    /// Whether a certificate with this SAN and issuer satisfies the identity
    pub fn matches(&self, san: Option<&str>, issuer: Option<&str>) -> bool {
        if san != Some(self.san.as_str()) {
            return false;
        }
        match &self.issuer {
            Some(expected) => issuer == Some(expected.as_str()),
            None => true,
        }
    }
}

impl VerificationOptions {
    /// Skip Certificate Transparency checks
    pub fn skip_ctlog(mut self) -> Self {
        self.ctlog_options.disable = true;
        self
    }

    /// Require `threshold` verified SCTs
    pub fn with_ctlog_threshold(mut self, threshold: usize) -> Self {
        self.ctlog_options.threshold = threshold;
        self
    }

    /// Skip transparency log checks
    pub fn skip_tlog(mut self) -> Self {
        self.tlog_options.disable = true;
        self
    }

    /// Require `threshold` verified transparency log entries
    pub fn with_tlog_threshold(mut self, threshold: usize) -> Self {
        self.tlog_options.threshold = threshold;
        self
    }

    /// Confirm transparency log entries online
    pub fn with_online_tlog_verification(mut self) -> Self {
        self.tlog_options.perform_online_verification = true;
        self
    }

    /// Only accept signers admitted by `policy`
    pub fn with_signers(mut self, policy: SignerPolicy) -> Self {
        self.signers = Some(policy);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = VerificationOptions::default();
        assert!(!options.ctlog_options.disable);
        assert_eq!(options.ctlog_options.threshold, DEFAULT_CTLOG_THRESHOLD);
        assert!(!options.tlog_options.disable);
        assert_eq!(options.tlog_options.threshold, DEFAULT_TLOG_THRESHOLD);
        assert!(!options.tlog_options.perform_online_verification);
        assert!(options.signers.is_none());
    }

    #[test]
    fn test_builder() {
        let options = VerificationOptions::default()
            .skip_tlog()
            .with_ctlog_threshold(2)
            .with_signers(SignerPolicy::CertificateIdentities(vec![
                CertificateIdentity::any_issuer("dev@example.com"),
            ]));
        assert!(options.tlog_options.disable);
        assert_eq!(options.ctlog_options.threshold, 2);
        assert!(matches!(
            options.signers,
            Some(SignerPolicy::CertificateIdentities(ref ids)) if ids.len() == 1
        ));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let options: VerificationOptions = serde_json::from_str(
            r#"{"ctlogOptions": {"threshold": 3}, "tlogOptions": {"disable": true}}"#,
        )
        .unwrap();
        assert_eq!(options.ctlog_options.threshold, 3);
        assert!(!options.ctlog_options.disable);
        assert!(options.tlog_options.disable);
        assert_eq!(options.tlog_options.threshold, DEFAULT_TLOG_THRESHOLD);
    }

    #[test]
    fn test_signer_policy_json() {
        let options: VerificationOptions = serde_json::from_str(
            r#"{"signers": {"certificateIdentities": [{"san": "dev@example.com", "issuer": "https://accounts.example.com"}]}}"#,
        )
        .unwrap();
        let Some(SignerPolicy::CertificateIdentities(ids)) = options.signers else {
            panic!("expected certificate identities");
        };
        assert_eq!(
            ids[0],
            CertificateIdentity::new("dev@example.com", "https://accounts.example.com")
        );

        let keys: SignerPolicy = serde_json::from_str(r#"{"publicKeys": ["AAEC"]}"#).unwrap();
        assert_eq!(keys, SignerPolicy::PublicKeys(vec![DerPublicKey::new(vec![0, 1, 2])]));
    }

    #[test]
    fn test_identity_matching() {
        let pinned = CertificateIdentity::new("dev@example.com", "https://issuer.example.com");
        assert!(pinned.matches(Some("dev@example.com"), Some("https://issuer.example.com")));
        assert!(!pinned.matches(Some("dev@example.com"), Some("https://other.example.com")));
        assert!(!pinned.matches(Some("dev@example.com"), None));
        assert!(!pinned.matches(None, Some("https://issuer.example.com")));

        let open = CertificateIdentity::any_issuer("dev@example.com");
        assert!(open.matches(Some("dev@example.com"), None));
        assert!(!open.matches(Some("other@example.com"), None));
    }
}
