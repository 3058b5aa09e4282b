//! # Payload Digests
//!
//! Defines `PayloadHash`, the 64-character lowercase hex SHA-256 digest
//! that identifies a compiled ruling payload and every committed ruling.
//!
//! ## Security Invariant
//!
//! `sha256_digest()` accepts only `&CanonicalBytes`. A payload hash is
//! therefore always computed over the exact canonical bytes that are
//! published alongside it, which makes the hash independently verifiable
//! from the serialized string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::ValidationError;

/// Length of a hex-encoded SHA-256 digest.
pub const HEX64_LEN: usize = 64;

/// A hex-encoded 256-bit digest (exactly 64 lowercase hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayloadHash(String);

impl PayloadHash {
    /// Parse a hex digest from an external record.
    ///
    /// Uppercase input is accepted and normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHash`] if the value is not 64 hex
    /// characters.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let candidate = value.trim();
        if candidate.len() != HEX64_LEN || !candidate.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidHash(value.to_string()));
        }
        Ok(Self(candidate.to_ascii_lowercase()))
    }

    /// Build from a raw 32-byte digest.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Access the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `n` hex characters, used for short derived identifiers.
    pub fn prefix(&self, n: usize) -> &str {
        &self.0[..n.min(HEX64_LEN)]
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PayloadHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PayloadHash {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PayloadHash> for String {
    fn from(hash: PayloadHash) -> Self {
        hash.0
    }
}

/// Compute the SHA-256 digest of canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> PayloadHash {
    digest_bytes(data.as_bytes())
}

/// Compute the SHA-256 hex string of canonical bytes.
///
/// Convenience wrapper around [`sha256_digest()`].
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).0
}

/// Compute the SHA-256 hex digest of a raw byte string.
///
/// Reserved for inputs that already have a fixed binary layout, such as the
/// record-ruling instruction encoding or an identifier seed. JSON-shaped
/// data must go through [`sha256_digest()`].
pub fn sha256_raw_hex(data: &[u8]) -> PayloadHash {
    digest_bytes(data)
}

fn digest_bytes(data: &[u8]) -> PayloadHash {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    PayloadHash::from_bytes(&bytes)
}
