//! Salted one-way hashing of national ID numbers.
//!
//! The raw NID number is hashed at the enrollment boundary and never stored
//! or exposed anywhere. The hash is globally unique per citizen — the
//! directory (and its storage constraint) rejects a second enrollment with
//! the same number under the same salt.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Hex-encoded SHA-256 over `nid_number || salt`.
///
/// Deliberately not `Display` — the hash itself is an identifier for
/// uniqueness checks, not a value to print or disclose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NidHash(String);

impl NidHash {
    /// Wrap an already-computed hash, e.g. when loading from storage.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Access the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hash a raw national ID number with the deployment salt.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidNid`] when the number is empty,
/// non-numeric, or implausibly long.
pub fn hash_nid(nid_number: &str, salt: &str) -> Result<NidHash, ValidationError> {
    let trimmed = nid_number.trim();
    if trimmed.is_empty()
        || trimmed.len() > 32
        || !trimmed.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidNid);
    }

    let mut hasher = Sha256::new();
    hasher.update(trimmed.as_bytes());
    hasher.update(salt.as_bytes());
    Ok(NidHash(hex::encode(hasher.finalize())))
}
