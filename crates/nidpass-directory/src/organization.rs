//! Verifier organization records and the registry store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use nidpass_core::{OrgApprovalStatus, OrgId};

use crate::error::DirectoryError;

/// A verifier organization (bank, telecom, government agency).
#[derive(Debug, Clone, Serialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    /// Free-form category, e.g. "Bank" or "Telecom".
    pub org_type: String,
    pub registration_number: String,
    pub contact_email: Option<String>,
    pub approval_status: OrgApprovalStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Whether this organization may appear in alias bindings and
    /// verification calls: approved by the onboarding workflow and not
    /// deactivated since.
    pub fn is_operational(&self) -> bool {
        self.approval_status == OrgApprovalStatus::Approved && self.is_active
    }
}

#[derive(Default)]
struct RegistryInner {
    by_id: HashMap<OrgId, Organization>,
    by_registration: HashMap<String, OrgId>,
}

/// Concurrent store of organizations, read-only to the verification core.
#[derive(Default)]
pub struct OrganizationRegistry {
    inner: RwLock<RegistryInner>,
}

impl OrganizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest an organization from the onboarding workflow.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateRegistration`] when a different
    /// organization already holds the registration number.
    pub fn ingest(&self, org: Organization) -> Result<(), DirectoryError> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.by_registration.get(&org.registration_number) {
            if *existing != org.id {
                return Err(DirectoryError::DuplicateRegistration(
                    org.registration_number.clone(),
                ));
            }
        }
        if let Some(previous) = inner.by_id.get(&org.id) {
            let stale = previous.registration_number.clone();
            if stale != org.registration_number {
                inner.by_registration.remove(&stale);
            }
        }
        inner
            .by_registration
            .insert(org.registration_number.clone(), org.id);
        inner.by_id.insert(org.id, org);
        Ok(())
    }

    /// Fetch an organization by id.
    pub fn get(&self, id: OrgId) -> Option<Organization> {
        self.inner.read().by_id.get(&id).cloned()
    }

    /// Fetch an organization by id, or fail.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::OrganizationNotFound`] for an unknown id.
    pub fn require(&self, id: OrgId) -> Result<Organization, DirectoryError> {
        self.get(id).ok_or(DirectoryError::OrganizationNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all organizations, for persistence hydration.
    pub fn list(&self) -> Vec<Organization> {
        self.inner.read().by_id.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(name: &str, reg: &str) -> Organization {
        let now = Utc::now();
        Organization {
            id: OrgId::new(),
            name: name.to_string(),
            org_type: "Bank".to_string(),
            registration_number: reg.to_string(),
            contact_email: None,
            approval_status: OrgApprovalStatus::Approved,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn ingest_and_get() {
        let registry = OrganizationRegistry::new();
        let o = org("City Bank", "REG-001");
        let id = o.id;
        registry.ingest(o).unwrap();
        assert_eq!(registry.get(id).unwrap().name, "City Bank");
    }

    #[test]
    fn duplicate_registration_rejected() {
        let registry = OrganizationRegistry::new();
        registry.ingest(org("City Bank", "REG-001")).unwrap();
        let err = registry.ingest(org("Other Bank", "REG-001")).unwrap_err();
        assert_eq!(
            err,
            DirectoryError::DuplicateRegistration("REG-001".into())
        );
    }

    #[test]
    fn operational_requires_approval_and_active() {
        let mut o = org("City Bank", "REG-001");
        assert!(o.is_operational());

        o.is_active = false;
        assert!(!o.is_operational());

        o.is_active = true;
        o.approval_status = OrgApprovalStatus::Pending;
        assert!(!o.is_operational());
    }

    #[test]
    fn require_unknown_fails() {
        let registry = OrganizationRegistry::new();
        let missing = OrgId::new();
        assert_eq!(
            registry.require(missing).unwrap_err(),
            DirectoryError::OrganizationNotFound(missing)
        );
    }
}
