//! The process-wide audit event log.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nidpass_core::{CitizenId, OrgId};

use crate::error::AuditError;
use crate::history::RequestMeta;

/// The sensitive actions the platform audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditKind {
    EnrollmentSubmitted,
    EnrollmentApproved,
    EnrollmentRejected,
    ConsentGranted,
    ConsentRevoked,
    VerificationCompleted,
    AliasGenerated,
    AliasRotated,
    Other,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::EnrollmentSubmitted => "ENROLLMENT_SUBMITTED",
            AuditKind::EnrollmentApproved => "ENROLLMENT_APPROVED",
            AuditKind::EnrollmentRejected => "ENROLLMENT_REJECTED",
            AuditKind::ConsentGranted => "CONSENT_GRANTED",
            AuditKind::ConsentRevoked => "CONSENT_REVOKED",
            AuditKind::VerificationCompleted => "VERIFICATION_COMPLETED",
            AuditKind::AliasGenerated => "ALIAS_GENERATED",
            AuditKind::AliasRotated => "ALIAS_ROTATED",
            AuditKind::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for AuditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited action. Immutable once appended; citizen and organization
/// references outlive the entities (the schema nulls them on delete rather
/// than cascading).
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub kind: AuditKind,
    /// Who performed the action, as the auth layer names them.
    pub actor: Option<String>,
    pub citizen_id: Option<CitizenId>,
    pub organization_id: Option<OrgId>,
    /// Event-specific detail (scope lists, alias ids, decision notes).
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub meta: RequestMeta,
}

impl AuditEvent {
    /// Build an event stamped `now` with empty metadata; callers fill in
    /// what the action warrants.
    pub fn new(kind: AuditKind, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            actor: None,
            citizen_id: None,
            organization_id: None,
            metadata: serde_json::Value::Null,
            created_at: at,
            meta: RequestMeta::default(),
        }
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn citizen(mut self, id: CitizenId) -> Self {
        self.citizen_id = Some(id);
        self
    }

    pub fn organization(mut self, id: OrgId) -> Self {
        self.organization_id = Some(id);
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn request_meta(mut self, meta: RequestMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Append-only store of audit events.
#[derive(Default)]
pub struct AuditLog {
    events: RwLock<Vec<AuditEvent>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn append(&self, event: AuditEvent) {
        self.events.write().push(event);
    }

    /// Every event, newest first. Admin-only at the API boundary.
    pub fn list(&self) -> Vec<AuditEvent> {
        let mut events: Vec<_> = self.events.read().clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Always fails: audit events are immutable.
    pub fn update(&self, id: Uuid) -> Result<(), AuditError> {
        tracing::error!(event = %id, "rejected attempt to update an immutable audit event");
        Err(AuditError::ImmutableRecord)
    }

    /// Always fails: audit events cannot be deleted.
    pub fn delete(&self, id: Uuid) -> Result<(), AuditError> {
        tracing::error!(event = %id, "rejected attempt to delete an immutable audit event");
        Err(AuditError::ImmutableRecord)
    }
}
