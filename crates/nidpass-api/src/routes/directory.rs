//! Enrollment and organization ingest routes (admin role).
//!
//! This is the boundary the external workflows call: enrollment review
//! hands over citizen records and decisions, organization onboarding hands
//! over organizations. The verification core itself never writes citizen
//! or organization state.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use nidpass_audit::{AuditEvent, AuditKind};
use nidpass_core::{hash_nid, CitizenId, EnrollmentStatus, OrgApprovalStatus, OrgId};
use nidpass_directory::{CitizenIdentity, Organization};

use crate::auth::{AuthContext, Operation};
use crate::error::AppError;
use crate::routes::record_audit;
use crate::state::AppState;

/// Build the ingest router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/citizens", post(ingest_citizen))
        .route("/v1/citizens/:id/decision", post(decide_enrollment))
        .route("/v1/organizations", post(ingest_organization))
}

/// A citizen record handed over by the enrollment workflow. The raw NID
/// number is hashed on ingest and discarded.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IngestCitizenRequest {
    pub full_name: String,
    /// Raw national ID number; never stored, only its salted hash.
    pub nid_number: String,
    pub date_of_birth: NaiveDate,
    pub residency_district: String,
    #[serde(default)]
    pub phone_verified: bool,
}

/// A citizen as returned from the ingest boundary. The NID hash never
/// appears.
#[derive(Debug, Serialize, ToSchema)]
pub struct CitizenResponse {
    pub id: Uuid,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub residency_district: String,
    pub phone_verified: bool,
    pub enrollment_status: String,
    pub created_at: DateTime<Utc>,
}

impl CitizenResponse {
    fn from_citizen(citizen: &CitizenIdentity) -> Self {
        Self {
            id: *citizen.id.as_uuid(),
            full_name: citizen.full_name.clone(),
            date_of_birth: citizen.date_of_birth,
            residency_district: citizen.residency_district.clone(),
            phone_verified: citizen.phone_verified,
            enrollment_status: citizen.enrollment_status.as_str().to_string(),
            created_at: citizen.created_at,
        }
    }
}

/// An enrollment decision.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollmentDecisionRequest {
    /// `APPROVED` or `REJECTED`.
    pub decision: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An organization handed over by the onboarding workflow.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IngestOrganizationRequest {
    pub name: String,
    /// e.g. "Bank", "Telecom", "Government".
    pub org_type: String,
    pub registration_number: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    /// Defaults to `APPROVED` — the onboarding workflow decides before
    /// handing over.
    #[serde(default)]
    pub approval_status: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// An organization as returned from the ingest boundary.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    pub org_type: String,
    pub registration_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub approval_status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl OrganizationResponse {
    fn from_org(org: &Organization) -> Self {
        Self {
            id: *org.id.as_uuid(),
            name: org.name.clone(),
            org_type: org.org_type.clone(),
            registration_number: org.registration_number.clone(),
            contact_email: org.contact_email.clone(),
            approval_status: org.approval_status.as_str().to_string(),
            is_active: org.is_active,
            created_at: org.created_at,
        }
    }
}

/// POST /v1/citizens — enrollment ingest.
#[utoipa::path(
    post,
    path = "/v1/citizens",
    request_body = IngestCitizenRequest,
    responses(
        (status = 201, description = "Citizen enrolled pending review", body = CitizenResponse),
        (status = 409, description = "National ID already enrolled", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid national ID number", body = crate::error::ErrorBody)
    )
)]
pub async fn ingest_citizen(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<IngestCitizenRequest>,
) -> Result<(StatusCode, Json<CitizenResponse>), AppError> {
    ctx.authorize(Operation::IngestCitizen)?;

    if body.full_name.trim().is_empty() {
        return Err(AppError::Validation("full_name must not be empty".into()));
    }

    let now = Utc::now();
    let citizen = CitizenIdentity {
        id: CitizenId::new(),
        full_name: body.full_name.trim().to_string(),
        nid_hash: hash_nid(&body.nid_number, &state.config.nid_salt)?,
        date_of_birth: body.date_of_birth,
        residency_district: body.residency_district,
        phone_verified: body.phone_verified,
        enrollment_status: EnrollmentStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    state.citizens.ingest(citizen.clone())?;

    if let Some(pool) = &state.db_pool {
        crate::db::records::save_citizen(pool, &citizen).await?;
    }
    record_audit(
        &state,
        AuditEvent::new(AuditKind::EnrollmentSubmitted, now)
            .actor("admin")
            .citizen(citizen.id)
            .request_meta(ctx.meta.clone()),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CitizenResponse::from_citizen(&citizen)),
    ))
}

/// POST /v1/citizens/:id/decision — record an enrollment decision.
#[utoipa::path(
    post,
    path = "/v1/citizens/{id}/decision",
    params(("id" = Uuid, Path, description = "Citizen id")),
    request_body = EnrollmentDecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = CitizenResponse),
        (status = 404, description = "Citizen not found", body = crate::error::ErrorBody),
        (status = 422, description = "Decision must be APPROVED or REJECTED", body = crate::error::ErrorBody)
    )
)]
pub async fn decide_enrollment(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(body): Json<EnrollmentDecisionRequest>,
) -> Result<Json<CitizenResponse>, AppError> {
    ctx.authorize(Operation::DecideEnrollment)?;

    let status = EnrollmentStatus::parse(&body.decision)?;
    let kind = match status {
        EnrollmentStatus::Approved => AuditKind::EnrollmentApproved,
        EnrollmentStatus::Rejected => AuditKind::EnrollmentRejected,
        EnrollmentStatus::Pending => {
            return Err(AppError::Validation(
                "decision must be APPROVED or REJECTED".into(),
            ));
        }
    };

    let now = Utc::now();
    let citizen = state
        .citizens
        .set_enrollment_status(CitizenId::from_uuid(id), status, now)?;

    if let Some(pool) = &state.db_pool {
        crate::db::records::save_citizen(pool, &citizen).await?;
    }
    record_audit(
        &state,
        AuditEvent::new(kind, now)
            .actor("admin")
            .citizen(citizen.id)
            .metadata(serde_json::json!({"notes": body.notes}))
            .request_meta(ctx.meta.clone()),
    )
    .await?;

    Ok(Json(CitizenResponse::from_citizen(&citizen)))
}

/// POST /v1/organizations — organization ingest.
#[utoipa::path(
    post,
    path = "/v1/organizations",
    request_body = IngestOrganizationRequest,
    responses(
        (status = 201, description = "Organization registered", body = OrganizationResponse),
        (status = 409, description = "Registration number taken", body = crate::error::ErrorBody)
    )
)]
pub async fn ingest_organization(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<IngestOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationResponse>), AppError> {
    ctx.authorize(Operation::IngestOrganization)?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    let approval_status = match body.approval_status.as_deref() {
        Some(raw) => OrgApprovalStatus::parse(raw)?,
        None => OrgApprovalStatus::Approved,
    };

    let now = Utc::now();
    let org = Organization {
        id: OrgId::new(),
        name: body.name.trim().to_string(),
        org_type: body.org_type,
        registration_number: body.registration_number,
        contact_email: body.contact_email,
        approval_status,
        is_active: body.is_active,
        created_at: now,
        updated_at: now,
    };
    state.organizations.ingest(org.clone())?;

    if let Some(pool) = &state.db_pool {
        crate::db::records::save_organization(pool, &org).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(OrganizationResponse::from_org(&org)),
    ))
}
