//! Disclosure scopes.
//!
//! The set is closed: a consent grant can only ever authorize these four
//! attribute categories, and the disclosure payload can only ever carry
//! their derived values. Unknown names are rejected at the parse boundary
//! with the offending value preserved for the error message.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A named category of disclosable citizen attribute, gated by consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Disclose the citizen's full legal name.
    NameMatch,
    /// Disclose whether the citizen is 18 or older (a boolean, not the
    /// date of birth).
    #[serde(rename = "age_over_18")]
    AgeOver18,
    /// Disclose whether the citizen's phone number has been verified.
    PhoneVerified,
    /// Disclose the citizen's district of residency.
    ResidencyDistrict,
}

impl Scope {
    /// Every scope, in wire-name order.
    pub const ALL: [Scope; 4] = [
        Scope::AgeOver18,
        Scope::NameMatch,
        Scope::PhoneVerified,
        Scope::ResidencyDistrict,
    ];

    /// The wire name of this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::NameMatch => "name_match",
            Scope::AgeOver18 => "age_over_18",
            Scope::PhoneVerified => "phone_verified",
            Scope::ResidencyDistrict => "residency_district",
        }
    }

    /// Parse a wire name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidScope`] carrying the offending
    /// value when the name is not one of the four known scopes.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        match name {
            "name_match" => Ok(Scope::NameMatch),
            "age_over_18" => Ok(Scope::AgeOver18),
            "phone_verified" => Ok(Scope::PhoneVerified),
            "residency_district" => Ok(Scope::ResidencyDistrict),
            other => Err(ValidationError::InvalidScope(other.to_string())),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::parse(s)
    }
}
