//! The consent grant record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use nidpass_core::{CitizenId, GrantId, OrgId, Scope};

/// A citizen's authorization for one organization to access specific
/// attribute scopes.
#[derive(Debug, Clone, Serialize)]
pub struct ConsentGrant {
    pub id: GrantId,
    pub citizen_id: CitizenId,
    pub organization_id: OrgId,
    pub scopes: BTreeSet<Scope>,
    pub is_active: bool,
    pub granted_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ConsentGrant {
    /// Whether this grant currently authorizes `scope`.
    ///
    /// An inactive grant authorizes nothing, whatever its stored scopes.
    pub fn has_scope(&self, scope: Scope) -> bool {
        self.is_active && self.scopes.contains(&scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(scopes: &[Scope], active: bool) -> ConsentGrant {
        ConsentGrant {
            id: GrantId::new(),
            citizen_id: CitizenId::new(),
            organization_id: OrgId::new(),
            scopes: scopes.iter().copied().collect(),
            is_active: active,
            granted_at: Utc::now(),
            revoked_at: None,
        }
    }

    #[test]
    fn has_scope_checks_membership() {
        let g = grant(&[Scope::NameMatch, Scope::AgeOver18], true);
        assert!(g.has_scope(Scope::NameMatch));
        assert!(!g.has_scope(Scope::ResidencyDistrict));
    }

    #[test]
    fn inactive_grant_authorizes_nothing() {
        let g = grant(&[Scope::NameMatch], false);
        assert!(!g.has_scope(Scope::NameMatch));
    }
}
