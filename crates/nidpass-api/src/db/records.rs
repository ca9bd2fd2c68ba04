//! Persistence for citizens, organizations, aliases, and consent grants.
//!
//! Each resource has a `save_*` upsert (`INSERT ... ON CONFLICT DO
//! UPDATE`) and a `load_all_*` bulk read for startup hydration.

use std::collections::BTreeSet;

use sqlx::PgPool;
use uuid::Uuid;

use nidpass_alias::{AliasIdentifier, AliasKind};
use nidpass_consent::ConsentGrant;
use nidpass_core::{
    AliasId, AliasToken, CitizenId, EnrollmentStatus, GrantId, NidHash, OrgApprovalStatus, OrgId,
    Scope,
};
use nidpass_directory::{CitizenIdentity, Organization};

/// Map a domain decode failure onto the sqlx error channel, the same way
/// the driver reports malformed rows.
fn protocol(err: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::Protocol(err.to_string())
}

// ── Citizens ────────────────────────────────────────────────────────

/// Upsert a citizen record.
pub async fn save_citizen(pool: &PgPool, citizen: &CitizenIdentity) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO citizens (id, full_name, nid_hash, date_of_birth, residency_district, phone_verified, enrollment_status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            nid_hash = EXCLUDED.nid_hash,
            date_of_birth = EXCLUDED.date_of_birth,
            residency_district = EXCLUDED.residency_district,
            phone_verified = EXCLUDED.phone_verified,
            enrollment_status = EXCLUDED.enrollment_status,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(citizen.id.as_uuid())
    .bind(&citizen.full_name)
    .bind(citizen.nid_hash.as_str())
    .bind(citizen.date_of_birth)
    .bind(&citizen.residency_district)
    .bind(citizen.phone_verified)
    .bind(citizen.enrollment_status.as_str())
    .bind(citizen.created_at)
    .bind(citizen.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all citizens for hydration.
pub async fn load_all_citizens(pool: &PgPool) -> Result<Vec<CitizenIdentity>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CitizenRow>(
        "SELECT id, full_name, nid_hash, date_of_birth, residency_district, phone_verified, enrollment_status, created_at, updated_at
         FROM citizens ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(CitizenRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct CitizenRow {
    id: Uuid,
    full_name: String,
    nid_hash: String,
    date_of_birth: chrono::NaiveDate,
    residency_district: String,
    phone_verified: bool,
    enrollment_status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl CitizenRow {
    fn into_record(self) -> Result<CitizenIdentity, sqlx::Error> {
        Ok(CitizenIdentity {
            id: CitizenId::from_uuid(self.id),
            full_name: self.full_name,
            nid_hash: NidHash::from_hex(self.nid_hash),
            date_of_birth: self.date_of_birth,
            residency_district: self.residency_district,
            phone_verified: self.phone_verified,
            enrollment_status: EnrollmentStatus::parse(&self.enrollment_status)
                .map_err(protocol)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ── Organizations ───────────────────────────────────────────────────

/// Upsert an organization record.
pub async fn save_organization(pool: &PgPool, org: &Organization) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO organizations (id, name, org_type, registration_number, contact_email, approval_status, is_active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            org_type = EXCLUDED.org_type,
            registration_number = EXCLUDED.registration_number,
            contact_email = EXCLUDED.contact_email,
            approval_status = EXCLUDED.approval_status,
            is_active = EXCLUDED.is_active,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(org.id.as_uuid())
    .bind(&org.name)
    .bind(&org.org_type)
    .bind(&org.registration_number)
    .bind(&org.contact_email)
    .bind(org.approval_status.as_str())
    .bind(org.is_active)
    .bind(org.created_at)
    .bind(org.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all organizations for hydration.
pub async fn load_all_organizations(pool: &PgPool) -> Result<Vec<Organization>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrganizationRow>(
        "SELECT id, name, org_type, registration_number, contact_email, approval_status, is_active, created_at, updated_at
         FROM organizations ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(OrganizationRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    org_type: String,
    registration_number: String,
    contact_email: Option<String>,
    approval_status: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl OrganizationRow {
    fn into_record(self) -> Result<Organization, sqlx::Error> {
        Ok(Organization {
            id: OrgId::from_uuid(self.id),
            name: self.name,
            org_type: self.org_type,
            registration_number: self.registration_number,
            contact_email: self.contact_email,
            approval_status: OrgApprovalStatus::parse(&self.approval_status).map_err(protocol)?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ── Aliases ─────────────────────────────────────────────────────────

/// Upsert an alias record. The upsert carries rotation: a rotated alias
/// re-saves under the same id with its new token and `rotated_at`.
pub async fn save_alias(pool: &PgPool, alias: &AliasIdentifier) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO aliases (id, citizen_id, kind, organization_id, token, created_at, rotated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (id) DO UPDATE SET
            token = EXCLUDED.token,
            rotated_at = EXCLUDED.rotated_at",
    )
    .bind(alias.id.as_uuid())
    .bind(alias.citizen_id.as_uuid())
    .bind(alias.kind.as_str())
    .bind(alias.organization_id.map(|id| *id.as_uuid()))
    .bind(alias.token.as_str())
    .bind(alias.created_at)
    .bind(alias.rotated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all aliases for hydration.
pub async fn load_all_aliases(pool: &PgPool) -> Result<Vec<AliasIdentifier>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AliasRow>(
        "SELECT id, citizen_id, kind, organization_id, token, created_at, rotated_at
         FROM aliases ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(AliasRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct AliasRow {
    id: Uuid,
    citizen_id: Uuid,
    kind: String,
    organization_id: Option<Uuid>,
    token: String,
    created_at: chrono::DateTime<chrono::Utc>,
    rotated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AliasRow {
    fn into_record(self) -> Result<AliasIdentifier, sqlx::Error> {
        let kind = match self.kind.as_str() {
            "GLOBAL" => AliasKind::Global,
            "PAIRWISE" => AliasKind::Pairwise,
            other => return Err(protocol(format!("unknown alias kind: {other:?}"))),
        };
        Ok(AliasIdentifier {
            id: AliasId::from_uuid(self.id),
            citizen_id: CitizenId::from_uuid(self.citizen_id),
            kind,
            organization_id: self.organization_id.map(OrgId::from_uuid),
            token: AliasToken::new(self.token).map_err(protocol)?,
            created_at: self.created_at,
            rotated_at: self.rotated_at,
        })
    }
}

// ── Consent grants ──────────────────────────────────────────────────

/// Upsert a consent grant. Grant, re-grant, and revoke all flow through
/// this one upsert keyed on the row id.
pub async fn save_consent(pool: &PgPool, grant: &ConsentGrant) -> Result<(), sqlx::Error> {
    let scopes = serde_json::to_value(
        grant.scopes.iter().map(Scope::as_str).collect::<Vec<_>>(),
    )
    .map_err(protocol)?;

    sqlx::query(
        "INSERT INTO consent_grants (id, citizen_id, organization_id, scopes, is_active, granted_at, revoked_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (id) DO UPDATE SET
            scopes = EXCLUDED.scopes,
            is_active = EXCLUDED.is_active,
            granted_at = EXCLUDED.granted_at,
            revoked_at = EXCLUDED.revoked_at",
    )
    .bind(grant.id.as_uuid())
    .bind(grant.citizen_id.as_uuid())
    .bind(grant.organization_id.as_uuid())
    .bind(&scopes)
    .bind(grant.is_active)
    .bind(grant.granted_at)
    .bind(grant.revoked_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all consent grants for hydration.
pub async fn load_all_consents(pool: &PgPool) -> Result<Vec<ConsentGrant>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ConsentRow>(
        "SELECT id, citizen_id, organization_id, scopes, is_active, granted_at, revoked_at
         FROM consent_grants ORDER BY granted_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ConsentRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct ConsentRow {
    id: Uuid,
    citizen_id: Uuid,
    organization_id: Uuid,
    scopes: serde_json::Value,
    is_active: bool,
    granted_at: chrono::DateTime<chrono::Utc>,
    revoked_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ConsentRow {
    fn into_record(self) -> Result<ConsentGrant, sqlx::Error> {
        let names: Vec<String> = serde_json::from_value(self.scopes).map_err(protocol)?;
        let scopes: BTreeSet<Scope> = names
            .iter()
            .map(|name| Scope::parse(name))
            .collect::<Result<_, _>>()
            .map_err(protocol)?;

        Ok(ConsentGrant {
            id: GrantId::from_uuid(self.id),
            citizen_id: CitizenId::from_uuid(self.citizen_id),
            organization_id: OrgId::from_uuid(self.organization_id),
            scopes,
            is_active: self.is_active,
            granted_at: self.granted_at,
            revoked_at: self.revoked_at,
        })
    }
}
