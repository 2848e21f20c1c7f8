//! Hash algorithm identifiers used in bundles

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Digest algorithms a message signature may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA2-256
    #[serde(rename = "SHA2_256")]
    Sha2256,
    /// SHA2-384
    #[serde(rename = "SHA2_384")]
    Sha2384,
    /// SHA2-512
    #[serde(rename = "SHA2_512")]
    Sha2512,
}

impl HashAlgorithm {
    /// Digest size in bytes
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha2256 => 32,
            HashAlgorithm::Sha2384 => 48,
            HashAlgorithm::Sha2512 => 64,
        }
    }

    /// Protobuf enum name
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha2256 => "SHA2_256",
            HashAlgorithm::Sha2384 => "SHA2_384",
            HashAlgorithm::Sha2512 => "SHA2_512",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SHA2_256" | "sha256" => Ok(HashAlgorithm::Sha2256),
            "SHA2_384" | "sha384" => Ok(HashAlgorithm::Sha2384),
            "SHA2_512" | "sha512" => Ok(HashAlgorithm::Sha2512),
            other => Err(Error::InvalidHashAlgorithm(other.to_string())),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
