//! Insert-only persistence for the write-once tables.
//!
//! Deliberately exposes no update or delete: `verification_history` and
//! `audit_events` rows are appended and read, nothing else. The schema's
//! `BEFORE UPDATE OR DELETE` triggers raise on any path that tries anyway.

use sqlx::PgPool;
use uuid::Uuid;

use nidpass_audit::{
    AuditEvent, AuditKind, RequestMeta, VerificationRecord, VerificationStatus,
};
use nidpass_core::{CitizenId, OrgId};

fn protocol(err: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::Protocol(err.to_string())
}

// ── Verification history ────────────────────────────────────────────

/// Append one verification record. Plain INSERT — there is no conflict
/// clause because an id collision would mean an attempted overwrite.
pub async fn insert_verification(
    pool: &PgPool,
    record: &VerificationRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO verification_history (id, organization_id, citizen_id, status, disclosed, verified_at, ip_address, user_agent)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(record.id)
    .bind(record.organization_id.as_uuid())
    .bind(record.citizen_id.as_uuid())
    .bind(record.status.as_str())
    .bind(&record.disclosed)
    .bind(record.verified_at)
    .bind(record.meta.ip_address.map(|ip| ip.to_string()))
    .bind(&record.meta.user_agent)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all verification records for hydration. Rows whose entity
/// references were nulled by a later deletion are skipped in-memory — the
/// store indexes by organization, and an orphaned row has none.
pub async fn load_all_verifications(
    pool: &PgPool,
) -> Result<Vec<VerificationRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, VerificationRow>(
        "SELECT id, organization_id, citizen_id, status, disclosed, verified_at, ip_address, user_agent
         FROM verification_history
         WHERE organization_id IS NOT NULL AND citizen_id IS NOT NULL
         ORDER BY verified_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(VerificationRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct VerificationRow {
    id: Uuid,
    organization_id: Option<Uuid>,
    citizen_id: Option<Uuid>,
    status: String,
    disclosed: serde_json::Value,
    verified_at: chrono::DateTime<chrono::Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl VerificationRow {
    fn into_record(self) -> Result<VerificationRecord, sqlx::Error> {
        let status: VerificationStatus =
            serde_json::from_value(serde_json::Value::String(self.status)).map_err(protocol)?;
        let organization_id = self
            .organization_id
            .ok_or_else(|| protocol("verification row without organization"))?;
        let citizen_id = self
            .citizen_id
            .ok_or_else(|| protocol("verification row without citizen"))?;

        Ok(VerificationRecord {
            id: self.id,
            organization_id: OrgId::from_uuid(organization_id),
            citizen_id: CitizenId::from_uuid(citizen_id),
            status,
            disclosed: self.disclosed,
            verified_at: self.verified_at,
            meta: RequestMeta {
                ip_address: self.ip_address.and_then(|ip| ip.parse().ok()),
                user_agent: self.user_agent,
            },
        })
    }
}

// ── Audit events ────────────────────────────────────────────────────

/// Append one audit event.
pub async fn insert_audit_event(pool: &PgPool, event: &AuditEvent) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_events (id, kind, actor, citizen_id, organization_id, metadata, ip_address, user_agent, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(event.id)
    .bind(event.kind.as_str())
    .bind(&event.actor)
    .bind(event.citizen_id.map(|id| *id.as_uuid()))
    .bind(event.organization_id.map(|id| *id.as_uuid()))
    .bind(&event.metadata)
    .bind(event.meta.ip_address.map(|ip| ip.to_string()))
    .bind(&event.meta.user_agent)
    .bind(event.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all audit events for hydration.
pub async fn load_all_audit_events(pool: &PgPool) -> Result<Vec<AuditEvent>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT id, kind, actor, citizen_id, organization_id, metadata, ip_address, user_agent, created_at
         FROM audit_events ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(AuditRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    kind: String,
    actor: Option<String>,
    citizen_id: Option<Uuid>,
    organization_id: Option<Uuid>,
    metadata: serde_json::Value,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl AuditRow {
    fn into_record(self) -> Result<AuditEvent, sqlx::Error> {
        let kind: AuditKind =
            serde_json::from_value(serde_json::Value::String(self.kind)).map_err(protocol)?;
        Ok(AuditEvent {
            id: self.id,
            kind,
            actor: self.actor,
            citizen_id: self.citizen_id.map(CitizenId::from_uuid),
            organization_id: self.organization_id.map(OrgId::from_uuid),
            metadata: self.metadata,
            created_at: self.created_at,
            meta: RequestMeta {
                ip_address: self.ip_address.and_then(|ip| ip.parse().ok()),
                user_agent: self.user_agent,
            },
        })
    }
}
