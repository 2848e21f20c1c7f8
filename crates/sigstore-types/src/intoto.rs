//! In-toto attestation statements
//!
//! DSSE bundles usually wrap an in-toto statement naming the artifacts
//! ("subjects") the attestation is about. See
//! https://github.com/in-toto/attestation/blob/main/spec/v1/statement.md

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// In-toto Statement (v0.1 and v1 share this shape)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Statement type URI
    #[serde(rename = "_type")]
    pub type_: String,
    /// Artifacts the statement is about
    #[serde(default)]
    pub subject: Vec<Subject>,
    /// Predicate type URI
    #[serde(default)]
    pub predicate_type: String,
    /// Predicate body, kept opaque
    #[serde(default)]
    pub predicate: serde_json::Value,
}

/// An artifact named by a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Artifact name
    #[serde(default)]
    pub name: String,
    /// Algorithm name to lowercase hex digest
    pub digest: BTreeMap<String, String>,
}

impl Statement {
    /// Parse a statement from a DSSE payload
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Whether any subject carries the given sha256 digest (hex, any case)
    pub fn matches_sha256(&self, hash_hex: &str) -> bool {
        self.subject.iter().any(|subject| {
            subject
                .digest
                .get("sha256")
                .is_some_and(|h| h.eq_ignore_ascii_case(hash_hex))
        })
    }
}
