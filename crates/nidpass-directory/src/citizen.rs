//! Citizen identity records and the directory store.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use nidpass_core::{CitizenId, EnrollmentStatus, NidHash};

use crate::error::DirectoryError;

/// An enrolled citizen's identity facts.
///
/// The NID number itself never appears here — only its salted hash, and the
/// hash is skipped on serialization so it cannot leak through any API
/// response built from this record.
#[derive(Debug, Clone, Serialize)]
pub struct CitizenIdentity {
    pub id: CitizenId,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub nid_hash: NidHash,
    pub date_of_birth: NaiveDate,
    pub residency_district: String,
    pub phone_verified: bool,
    pub enrollment_status: EnrollmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CitizenIdentity {
    /// Whether the enrollment workflow has approved this citizen.
    pub fn is_approved(&self) -> bool {
        self.enrollment_status == EnrollmentStatus::Approved
    }
}

#[derive(Default)]
struct DirectoryInner {
    by_id: HashMap<CitizenId, CitizenIdentity>,
    by_nid: HashMap<NidHash, CitizenId>,
}

/// Concurrent store of citizen identities.
///
/// Reads are the common case (every mint and verification resolves a
/// citizen); writes happen only at the enrollment boundary. A single lock
/// keeps the NID-hash uniqueness index consistent with the primary map.
#[derive(Default)]
pub struct CitizenDirectory {
    inner: RwLock<DirectoryInner>,
}

impl CitizenDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a citizen record from the enrollment workflow.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::DuplicateNid`] when a *different* citizen
    /// already holds the same NID hash. Re-ingesting the same citizen id
    /// replaces the record (the enrollment workflow owns updates).
    pub fn ingest(&self, citizen: CitizenIdentity) -> Result<(), DirectoryError> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.by_nid.get(&citizen.nid_hash) {
            if *existing != citizen.id {
                return Err(DirectoryError::DuplicateNid);
            }
        }
        if let Some(previous) = inner.by_id.get(&citizen.id) {
            let stale = previous.nid_hash.clone();
            if stale != citizen.nid_hash {
                inner.by_nid.remove(&stale);
            }
        }
        inner.by_nid.insert(citizen.nid_hash.clone(), citizen.id);
        inner.by_id.insert(citizen.id, citizen);
        Ok(())
    }

    /// Record an enrollment decision, returning the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CitizenNotFound`] for an unknown id.
    pub fn set_enrollment_status(
        &self,
        id: CitizenId,
        status: EnrollmentStatus,
        at: DateTime<Utc>,
    ) -> Result<CitizenIdentity, DirectoryError> {
        let mut inner = self.inner.write();
        let citizen = inner
            .by_id
            .get_mut(&id)
            .ok_or(DirectoryError::CitizenNotFound(id))?;
        citizen.enrollment_status = status;
        citizen.updated_at = at;
        Ok(citizen.clone())
    }

    /// Fetch a citizen by id.
    pub fn get(&self, id: CitizenId) -> Option<CitizenIdentity> {
        self.inner.read().by_id.get(&id).cloned()
    }

    /// Fetch a citizen by id, or fail.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CitizenNotFound`] for an unknown id.
    pub fn require(&self, id: CitizenId) -> Result<CitizenIdentity, DirectoryError> {
        self.get(id).ok_or(DirectoryError::CitizenNotFound(id))
    }

    /// Number of citizens on record.
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all citizens, for persistence hydration.
    pub fn list(&self) -> Vec<CitizenIdentity> {
        self.inner.read().by_id.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nidpass_core::hash_nid;

    fn citizen(name: &str, nid: &str) -> CitizenIdentity {
        let now = Utc::now();
        CitizenIdentity {
            id: CitizenId::new(),
            full_name: name.to_string(),
            nid_hash: hash_nid(nid, "test-salt").unwrap(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 14).unwrap(),
            residency_district: "Dhanmondi".to_string(),
            phone_verified: true,
            enrollment_status: EnrollmentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn ingest_and_get() {
        let dir = CitizenDirectory::new();
        let c = citizen("Amina Rahman", "1234567890123");
        let id = c.id;
        dir.ingest(c).unwrap();
        assert_eq!(dir.get(id).unwrap().full_name, "Amina Rahman");
    }

    #[test]
    fn duplicate_nid_rejected_for_different_citizen() {
        let dir = CitizenDirectory::new();
        dir.ingest(citizen("Amina Rahman", "1234567890123")).unwrap();
        let err = dir
            .ingest(citizen("Someone Else", "1234567890123"))
            .unwrap_err();
        assert_eq!(err, DirectoryError::DuplicateNid);
    }

    #[test]
    fn reingest_same_citizen_replaces_record() {
        let dir = CitizenDirectory::new();
        let mut c = citizen("Amina Rahman", "1234567890123");
        let id = c.id;
        dir.ingest(c.clone()).unwrap();
        c.phone_verified = false;
        dir.ingest(c).unwrap();
        assert!(!dir.get(id).unwrap().phone_verified);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn enrollment_decision_updates_status() {
        let dir = CitizenDirectory::new();
        let c = citizen("Amina Rahman", "1234567890123");
        let id = c.id;
        dir.ingest(c).unwrap();

        let updated = dir
            .set_enrollment_status(id, EnrollmentStatus::Approved, Utc::now())
            .unwrap();
        assert!(updated.is_approved());
        assert!(dir.get(id).unwrap().is_approved());
    }

    #[test]
    fn decision_on_unknown_citizen_fails() {
        let dir = CitizenDirectory::new();
        let missing = CitizenId::new();
        let err = dir
            .set_enrollment_status(missing, EnrollmentStatus::Approved, Utc::now())
            .unwrap_err();
        assert_eq!(err, DirectoryError::CitizenNotFound(missing));
    }

    #[test]
    fn nid_hash_not_serialized() {
        let c = citizen("Amina Rahman", "1234567890123");
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("nid_hash").is_none());
        assert!(json.get("full_name").is_some());
    }
}
