//! The verification history log.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nidpass_core::{CitizenId, OrgId};

use crate::error::AuditError;

/// Request metadata captured alongside history and audit records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMeta {
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
}

/// Outcome recorded for a verification.
///
/// Only successful disclosures are written to history in this design —
/// denied and not-found outcomes are logged via tracing at the boundary
/// instead of stored. The enum leaves room to change that decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Success,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Success => "SUCCESS",
        }
    }
}

/// One completed verification: who verified whom, what was disclosed, when,
/// and from where. Immutable once appended.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRecord {
    pub id: Uuid,
    pub organization_id: OrgId,
    pub citizen_id: CitizenId,
    pub status: VerificationStatus,
    /// The disclosure payload as returned to the organization — the
    /// attribute values themselves, not just the scope names, so the
    /// record shows exactly what left the system.
    pub disclosed: serde_json::Value,
    pub verified_at: DateTime<Utc>,
    #[serde(flatten)]
    pub meta: RequestMeta,
}

/// Append-only store of verification records.
#[derive(Default)]
pub struct VerificationLog {
    records: RwLock<Vec<VerificationRecord>>,
}

impl VerificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Infallible: the sink accepts everything handed to
    /// it and never reorders.
    pub fn append(&self, record: VerificationRecord) {
        self.records.write().push(record);
    }

    /// History for one organization, newest first.
    pub fn list_for_org(&self, organization_id: OrgId) -> Vec<VerificationRecord> {
        let mut records: Vec<_> = self
            .records
            .read()
            .iter()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.verified_at.cmp(&a.verified_at));
        records
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all records, for persistence hydration.
    pub fn list(&self) -> Vec<VerificationRecord> {
        self.records.read().clone()
    }

    /// Always fails: history records are immutable. Present so tooling
    /// paths hit a hard error instead of a missing method.
    pub fn update(&self, id: Uuid) -> Result<(), AuditError> {
        tracing::error!(record = %id, "rejected attempt to update an immutable verification record");
        Err(AuditError::ImmutableRecord)
    }

    /// Always fails: history records cannot be deleted.
    pub fn delete(&self, id: Uuid) -> Result<(), AuditError> {
        tracing::error!(record = %id, "rejected attempt to delete an immutable verification record");
        Err(AuditError::ImmutableRecord)
    }
}
