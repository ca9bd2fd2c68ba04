//! The consent ledger store.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use nidpass_core::{CitizenId, GrantId, OrgId, Scope};

use crate::error::ConsentError;
use crate::grant::ConsentGrant;

#[derive(Default)]
struct LedgerInner {
    by_id: HashMap<GrantId, ConsentGrant>,
    by_pair: HashMap<(CitizenId, OrgId), GrantId>,
}

/// Concurrent store of consent grants, one row per `(citizen, org)`.
///
/// Both indices live behind a single lock: `grant` and `revoke` for the
/// same pair serialize, and the pair index can never point at a missing
/// row.
#[derive(Default)]
pub struct ConsentLedger {
    inner: RwLock<LedgerInner>,
}

impl ConsentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant (or re-grant) consent. Upserts the `(citizen, org)` row:
    /// scopes are replaced, the grant reactivates, `revoked_at` clears,
    /// and `granted_at` refreshes. The row id is stable across re-grants.
    pub fn grant(
        &self,
        citizen_id: CitizenId,
        organization_id: OrgId,
        scopes: BTreeSet<Scope>,
        at: DateTime<Utc>,
    ) -> ConsentGrant {
        let mut inner = self.inner.write();
        let key = (citizen_id, organization_id);

        if let Some(id) = inner.by_pair.get(&key).copied() {
            let row = inner
                .by_id
                .get_mut(&id)
                .expect("pair index points at a live row");
            row.scopes = scopes;
            row.is_active = true;
            row.revoked_at = None;
            row.granted_at = at;
            return row.clone();
        }

        let row = ConsentGrant {
            id: GrantId::new(),
            citizen_id,
            organization_id,
            scopes,
            is_active: true,
            granted_at: at,
            revoked_at: None,
        };
        inner.by_pair.insert(key, row.id);
        inner.by_id.insert(row.id, row.clone());
        row
    }

    /// Revoke a grant on behalf of `citizen_id`.
    ///
    /// Ownership is checked before anything mutates; revoking an
    /// already-revoked grant is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConsentError::GrantNotFound`] when the grant does not
    /// exist or belongs to a different citizen.
    pub fn revoke(
        &self,
        grant_id: GrantId,
        citizen_id: CitizenId,
        at: DateTime<Utc>,
    ) -> Result<ConsentGrant, ConsentError> {
        let mut inner = self.inner.write();
        let row = inner
            .by_id
            .get_mut(&grant_id)
            .filter(|g| g.citizen_id == citizen_id)
            .ok_or(ConsentError::GrantNotFound(grant_id))?;

        if row.is_active {
            row.is_active = false;
            row.revoked_at = Some(at);
            tracing::info!(grant = %grant_id, citizen = %citizen_id, "consent revoked");
        }
        Ok(row.clone())
    }

    /// The active grant between a citizen and an organization, if any.
    ///
    /// This is the query the verification engine gates on: a revoked row
    /// is reported as `None`.
    pub fn active_grant(
        &self,
        citizen_id: CitizenId,
        organization_id: OrgId,
    ) -> Option<ConsentGrant> {
        let inner = self.inner.read();
        inner
            .by_pair
            .get(&(citizen_id, organization_id))
            .and_then(|id| inner.by_id.get(id))
            .filter(|g| g.is_active)
            .cloned()
    }

    /// Whether an active grant authorizes `scope` for this pair.
    pub fn has_scope(&self, citizen_id: CitizenId, organization_id: OrgId, scope: Scope) -> bool {
        self.active_grant(citizen_id, organization_id)
            .is_some_and(|g| g.has_scope(scope))
    }

    /// Fetch a grant row by id.
    pub fn get(&self, grant_id: GrantId) -> Option<ConsentGrant> {
        self.inner.read().by_id.get(&grant_id).cloned()
    }

    /// All active grants a citizen holds, newest first.
    pub fn list_active_for_citizen(&self, citizen_id: CitizenId) -> Vec<ConsentGrant> {
        let mut grants: Vec<_> = self
            .inner
            .read()
            .by_id
            .values()
            .filter(|g| g.citizen_id == citizen_id && g.is_active)
            .cloned()
            .collect();
        grants.sort_by(|a, b| b.granted_at.cmp(&a.granted_at));
        grants
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every grant row (active and revoked), for persistence
    /// hydration.
    pub fn list(&self) -> Vec<ConsentGrant> {
        self.inner.read().by_id.values().cloned().collect()
    }

    /// Re-insert a previously persisted grant on startup, revoked rows
    /// included.
    pub fn restore(&self, grant: ConsentGrant) {
        let mut inner = self.inner.write();
        inner
            .by_pair
            .insert((grant.citizen_id, grant.organization_id), grant.id);
        inner.by_id.insert(grant.id, grant);
    }
}
