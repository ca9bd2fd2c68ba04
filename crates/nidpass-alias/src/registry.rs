//! The alias registry store and its operations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use nidpass_core::{AliasId, AliasToken, CitizenId, OrgId};
use nidpass_directory::{CitizenDirectory, OrganizationRegistry};

use crate::error::AliasError;
use crate::model::{AliasIdentifier, AliasKind};

/// Result of a mint call: the registry reports whether it created a row or
/// returned the occupant of an already-filled slot, so callers can pick
/// their response status and audit only genuine creations.
#[derive(Debug, Clone)]
pub enum MintOutcome {
    /// A new alias was created.
    Fresh(AliasIdentifier),
    /// The slot was already occupied; this is the existing alias, unchanged.
    Existing(AliasIdentifier),
}

impl MintOutcome {
    /// The alias, however it was obtained.
    pub fn alias(&self) -> &AliasIdentifier {
        match self {
            MintOutcome::Fresh(a) | MintOutcome::Existing(a) => a,
        }
    }

    /// Whether the call created the row.
    pub fn is_fresh(&self) -> bool {
        matches!(self, MintOutcome::Fresh(_))
    }
}

#[derive(Default)]
struct RegistryInner {
    by_id: HashMap<AliasId, AliasIdentifier>,
    by_token: HashMap<AliasToken, AliasId>,
    by_slot: HashMap<(CitizenId, AliasKind, Option<OrgId>), AliasId>,
}

impl RegistryInner {
    /// Generate a token absent from the token index. The 48-bit space makes
    /// a collision freakishly unlikely; the loop is the in-process backstop
    /// and the storage UNIQUE constraint the cross-process one.
    fn fresh_token(&self) -> AliasToken {
        loop {
            let token = AliasToken::generate();
            if !self.by_token.contains_key(&token) {
                return token;
            }
        }
    }
}

/// Mints and resolves alias identifiers.
///
/// Holds read handles on the citizen directory and organization registry
/// for the mint preconditions; never writes either.
pub struct AliasRegistry {
    citizens: Arc<CitizenDirectory>,
    organizations: Arc<OrganizationRegistry>,
    inner: RwLock<RegistryInner>,
}

impl AliasRegistry {
    pub fn new(citizens: Arc<CitizenDirectory>, organizations: Arc<OrganizationRegistry>) -> Self {
        Self {
            citizens,
            organizations,
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Mint an alias for a citizen, or return the existing occupant of the
    /// `(citizen, kind, organization)` slot.
    ///
    /// Preconditions, in order:
    /// 1. the citizen exists and their enrollment is approved;
    /// 2. organization presence matches the kind (absent for global,
    ///    present for pairwise);
    /// 3. a pairwise target organization exists, is approved, and active.
    ///
    /// # Errors
    ///
    /// [`AliasError::CitizenNotFound`], [`AliasError::NotVerified`],
    /// [`AliasError::InvalidSpec`], [`AliasError::OrganizationNotFound`].
    pub fn mint(
        &self,
        citizen_id: CitizenId,
        kind: AliasKind,
        organization_id: Option<OrgId>,
        at: DateTime<Utc>,
    ) -> Result<MintOutcome, AliasError> {
        let citizen = self
            .citizens
            .get(citizen_id)
            .ok_or(AliasError::CitizenNotFound(citizen_id))?;
        if !citizen.is_approved() {
            return Err(AliasError::NotVerified);
        }

        match (kind, organization_id) {
            (AliasKind::Global, Some(_)) => {
                return Err(AliasError::InvalidSpec(
                    "organization must be absent for a global alias".into(),
                ));
            }
            (AliasKind::Pairwise, None) => {
                return Err(AliasError::InvalidSpec(
                    "organization is required for a pairwise alias".into(),
                ));
            }
            (AliasKind::Pairwise, Some(org_id)) => {
                let operational = self
                    .organizations
                    .get(org_id)
                    .is_some_and(|org| org.is_operational());
                if !operational {
                    return Err(AliasError::OrganizationNotFound(org_id));
                }
            }
            (AliasKind::Global, None) => {}
        }

        let mut inner = self.inner.write();
        let slot = (citizen_id, kind, organization_id);

        // Idempotent mint: the slot's occupant wins, including for the
        // loser of a concurrent first-mint race.
        if let Some(id) = inner.by_slot.get(&slot).copied() {
            let existing = inner
                .by_id
                .get(&id)
                .expect("slot index points at a live row")
                .clone();
            return Ok(MintOutcome::Existing(existing));
        }

        let alias = AliasIdentifier {
            id: AliasId::new(),
            citizen_id,
            kind,
            organization_id,
            token: inner.fresh_token(),
            created_at: at,
            rotated_at: None,
        };
        inner.by_slot.insert(alias.slot(), alias.id);
        inner.by_token.insert(alias.token.clone(), alias.id);
        inner.by_id.insert(alias.id, alias.clone());

        tracing::info!(alias = %alias.id, kind = %kind, "alias minted");
        Ok(MintOutcome::Fresh(alias))
    }

    /// Rotate an alias token on behalf of its owner.
    ///
    /// The row id, kind, and organization binding are preserved; only the
    /// token changes and `rotated_at` is stamped. The old token stops
    /// resolving in the same critical section that makes the new one
    /// resolve.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::AliasNotFound`] when the row does not exist
    /// or belongs to a different citizen.
    pub fn rotate(
        &self,
        alias_id: AliasId,
        citizen_id: CitizenId,
        at: DateTime<Utc>,
    ) -> Result<AliasIdentifier, AliasError> {
        let mut inner = self.inner.write();

        let owner_ok = inner
            .by_id
            .get(&alias_id)
            .is_some_and(|a| a.citizen_id == citizen_id);
        if !owner_ok {
            return Err(AliasError::AliasNotFound(alias_id));
        }

        let token = inner.fresh_token();
        let row = inner
            .by_id
            .get_mut(&alias_id)
            .expect("ownership checked above");
        let old_token = std::mem::replace(&mut row.token, token.clone());
        row.rotated_at = Some(at);
        let rotated = row.clone();

        inner.by_token.remove(&old_token);
        inner.by_token.insert(token, alias_id);

        tracing::info!(alias = %alias_id, "alias token rotated");
        Ok(rotated)
    }

    /// Resolve a presented token to its alias. Strips the QR scan marker,
    /// then matches exactly — no fuzzy or prefix matching.
    ///
    /// # Errors
    ///
    /// Returns [`AliasError::UnknownToken`] for malformed and unknown
    /// tokens alike; a token that cannot exist is indistinguishable from
    /// one that does not.
    pub fn lookup(&self, raw_token: &str) -> Result<AliasIdentifier, AliasError> {
        let token = AliasToken::from_scanned(raw_token).map_err(|_| AliasError::UnknownToken)?;
        let inner = self.inner.read();
        inner
            .by_token
            .get(&token)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
            .ok_or(AliasError::UnknownToken)
    }

    /// All aliases a citizen owns, newest first.
    pub fn list_for_citizen(&self, citizen_id: CitizenId) -> Vec<AliasIdentifier> {
        let mut aliases: Vec<_> = self
            .inner
            .read()
            .by_id
            .values()
            .filter(|a| a.citizen_id == citizen_id)
            .cloned()
            .collect();
        aliases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        aliases
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all aliases, for persistence hydration.
    pub fn list(&self) -> Vec<AliasIdentifier> {
        self.inner.read().by_id.values().cloned().collect()
    }

    /// Re-insert a previously persisted alias on startup. Skips the mint
    /// preconditions — the row was validated when it was created — but
    /// still populates every index.
    pub fn restore(&self, alias: AliasIdentifier) {
        let mut inner = self.inner.write();
        inner.by_slot.insert(alias.slot(), alias.id);
        inner.by_token.insert(alias.token.clone(), alias.id);
        inner.by_id.insert(alias.id, alias);
    }
}
