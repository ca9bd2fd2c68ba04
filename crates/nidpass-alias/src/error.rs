//! Alias registry errors.

use nidpass_core::{AliasId, CitizenId, OrgId};
use thiserror::Error;

/// Errors from minting, rotating, and resolving aliases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    /// The citizen exists but the enrollment workflow has not approved
    /// them, so no alias may be minted yet.
    #[error("citizen enrollment is not approved")]
    NotVerified,

    /// No citizen with this id.
    #[error("citizen not found: {0}")]
    CitizenNotFound(CitizenId),

    /// Organization presence did not match the alias kind: global aliases
    /// must not name one, pairwise aliases must.
    #[error("invalid alias specification: {0}")]
    InvalidSpec(String),

    /// The named organization does not exist — or is not approved and
    /// active. The cases are merged so an unapproved organization cannot
    /// be discovered through alias minting.
    #[error("organization not found: {0}")]
    OrganizationNotFound(OrgId),

    /// No alias resolves to the presented token.
    #[error("unknown alias token")]
    UnknownToken,

    /// The alias row does not exist — or belongs to a different citizen.
    #[error("alias not found: {0}")]
    AliasNotFound(AliasId),
}
