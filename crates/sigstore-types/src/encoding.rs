//! Type-safe encoding wrappers
//!
//! Binary fields in Sigstore JSON documents are carried as standard base64.
//! Each field gets its own newtype holding the *decoded* bytes, so a
//! certificate can never be handed to something expecting a signature and
//! nothing has to remember whether a `Vec<u8>` was already decoded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! base64_bytes {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(Vec<u8>);

        impl $name {
            /// Wrap already-decoded bytes
            pub fn new(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }

            /// Decode from a base64 string
            pub fn from_base64(s: &str) -> crate::Result<Self> {
                Ok(Self(STANDARD.decode(s)?))
            }

            /// Encode as a base64 string
            pub fn to_base64(&self) -> String {
                STANDARD.encode(&self.0)
            }

            /// Borrow the raw bytes
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Take the raw bytes
            pub fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            /// Whether no bytes are held
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }
        }

        impl From<&[u8]> for $name {
            fn from(bytes: &[u8]) -> Self {
                Self(bytes.to_vec())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_base64())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                STANDARD
                    .decode(s.trim())
                    .map(Self)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

base64_bytes!(
    /// DER-encoded X.509 certificate
    DerCertificate
);

base64_bytes!(
    /// DER-encoded SubjectPublicKeyInfo
    DerPublicKey
);

base64_bytes!(
    /// Raw signature bytes (ASN.1 DER for ECDSA, fixed-size for Ed25519)
    SignatureBytes
);

base64_bytes!(
    /// DSSE payload bytes
    PayloadBytes
);

base64_bytes!(
    /// Transparency or CT log key identifier (SHA-256 of the log's public key)
    LogKeyId
);

base64_bytes!(
    /// Canonicalized log entry body
    CanonicalizedBody
);

base64_bytes!(
    /// Signed entry timestamp from a log inclusion promise
    SignedTimestamp
);

base64_bytes!(
    /// Digest bytes produced by a hash algorithm
    DigestBytes
);

impl DigestBytes {
    /// Lowercase hex rendering, as used in in-toto subjects
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Serde helper for i64 values that protobuf JSON encodes as strings
///
/// Accepts both `"123"` and `123` when deserializing, always writes a string.
pub mod string_i64 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i64),
    }

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrInt::deserialize(deserializer)? {
            StringOrInt::String(s) => s.parse().map_err(de::Error::custom),
            StringOrInt::Int(i) => Ok(i),
        }
    }
}
