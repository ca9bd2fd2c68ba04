//! The alias identifier record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nidpass_core::{AliasId, AliasToken, CitizenId, OrgId};

/// The two alias kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AliasKind {
    /// One per citizen, disclosable to any organization.
    Global,
    /// One per `(citizen, organization)`; prevents cross-organization
    /// correlation.
    Pairwise,
}

impl AliasKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AliasKind::Global => "GLOBAL",
            AliasKind::Pairwise => "PAIRWISE",
        }
    }
}

impl std::fmt::Display for AliasKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A disclosable pseudonym owned by one citizen.
///
/// `organization_id` is `Some` exactly when `kind` is [`AliasKind::Pairwise`]
/// — the registry refuses to mint anything else. The row `id` survives
/// token rotation; the token does not.
#[derive(Debug, Clone, Serialize)]
pub struct AliasIdentifier {
    pub id: AliasId,
    pub citizen_id: CitizenId,
    pub kind: AliasKind,
    pub organization_id: Option<OrgId>,
    pub token: AliasToken,
    pub created_at: DateTime<Utc>,
    pub rotated_at: Option<DateTime<Utc>>,
}

impl AliasIdentifier {
    /// The slot this alias occupies — the tuple the one-per-slot
    /// invariant is keyed on.
    pub(crate) fn slot(&self) -> (CitizenId, AliasKind, Option<OrgId>) {
        (self.citizen_id, self.kind, self.organization_id)
    }
}
