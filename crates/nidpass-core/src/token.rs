//! Alias tokens.
//!
//! The token is the only citizen-correlated value that ever leaves the
//! system: an opaque `ALIAS-` string resolved back to a citizen purely by
//! server-side lookup. Tokens embedded in QR payloads arrive prefixed with
//! [`SCAN_PREFIX`], which is stripped before any lookup.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Scan-format marker prepended to tokens in QR payloads.
pub const SCAN_PREFIX: &str = "NID_VERIFY:";

const TOKEN_PREFIX: &str = "ALIAS-";
const TOKEN_HEX_LEN: usize = 12;

/// An opaque pseudonymous identifier: `ALIAS-` followed by 12 uppercase
/// hex characters.
///
/// Globally unique across all citizens and alias kinds — uniqueness is
/// enforced by the alias registry (and its storage constraints), not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AliasToken(String);

impl<'de> Deserialize<'de> for AliasToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl AliasToken {
    /// Validate and wrap a token string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAliasToken`] when the value is not
    /// `ALIAS-` + 12 uppercase hex characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let Some(hex) = s.strip_prefix(TOKEN_PREFIX) else {
            return Err(ValidationError::InvalidAliasToken(s));
        };
        if hex.len() != TOKEN_HEX_LEN
            || !hex
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase() && c.is_ascii_hexdigit())
        {
            return Err(ValidationError::InvalidAliasToken(s));
        }
        Ok(Self(s))
    }

    /// Parse a token as it arrives from a caller or a QR scan, stripping
    /// the [`SCAN_PREFIX`] marker if present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAliasToken`] when what remains
    /// after stripping is not a well-formed token.
    pub fn from_scanned(raw: &str) -> Result<Self, ValidationError> {
        let stripped = raw.strip_prefix(SCAN_PREFIX).unwrap_or(raw);
        Self::new(stripped)
    }

    /// Mint a fresh token from 48 bits of UUIDv4 entropy.
    ///
    /// Collisions are possible in principle; the registry retries against
    /// its uniqueness index when one occurs.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{TOKEN_PREFIX}{}",
            hex[..TOKEN_HEX_LEN].to_ascii_uppercase()
        ))
    }

    /// Access the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token in QR payload form, with the scan marker prepended.
    pub fn to_scan_payload(&self) -> String {
        format!("{SCAN_PREFIX}{}", self.0)
    }
}

impl std::fmt::Display for AliasToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
