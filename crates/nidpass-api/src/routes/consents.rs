//! Consent management routes (citizen role).

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use nidpass_audit::{AuditEvent, AuditKind};
use nidpass_consent::ConsentGrant;
use nidpass_core::{GrantId, OrgId, Scope};

use crate::auth::{AuthContext, Operation};
use crate::error::AppError;
use crate::routes::record_audit;
use crate::state::AppState;

/// Build the consent router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/consents", get(list_consents).post(grant_consent))
        .route("/v1/consents/:id/revoke", post(revoke_consent))
}

/// Request to grant (or re-grant) consent to an organization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantConsentRequest {
    pub organization_id: Uuid,
    /// Scope names: `name_match`, `age_over_18`, `phone_verified`,
    /// `residency_district`.
    pub scopes: Vec<String>,
}

/// A consent grant as returned to its owning citizen.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrantResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    pub scopes: Vec<String>,
    pub is_active: bool,
    pub granted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl GrantResponse {
    fn from_grant(state: &AppState, grant: &ConsentGrant) -> Self {
        let organization_name = state
            .organizations
            .get(grant.organization_id)
            .map(|org| org.name);
        Self {
            id: *grant.id.as_uuid(),
            organization_id: *grant.organization_id.as_uuid(),
            organization_name,
            scopes: grant.scopes.iter().map(|s| s.as_str().to_string()).collect(),
            is_active: grant.is_active,
            granted_at: grant.granted_at,
            revoked_at: grant.revoked_at,
        }
    }
}

/// Revocation acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeResponse {
    pub status: String,
}

/// Parse scope names, rejecting the first unknown one by name.
fn parse_scopes(names: &[String]) -> Result<BTreeSet<Scope>, AppError> {
    names
        .iter()
        .map(|name| Scope::parse(name).map_err(AppError::from))
        .collect()
}

/// GET /v1/consents — the caller's active grants, newest first.
#[utoipa::path(
    get,
    path = "/v1/consents",
    responses(
        (status = 200, description = "Active grants", body = [GrantResponse]),
        (status = 403, description = "Caller is not a citizen", body = crate::error::ErrorBody)
    )
)]
pub async fn list_consents(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Vec<GrantResponse>>, AppError> {
    ctx.authorize(Operation::ListConsents)?;
    let citizen = ctx.require_citizen()?;

    let grants = state
        .consents
        .list_active_for_citizen(citizen)
        .iter()
        .map(|g| GrantResponse::from_grant(&state, g))
        .collect();
    Ok(Json(grants))
}

/// POST /v1/consents — grant consent (upsert per organization).
#[utoipa::path(
    post,
    path = "/v1/consents",
    request_body = GrantConsentRequest,
    responses(
        (status = 201, description = "Consent granted", body = GrantResponse),
        (status = 404, description = "Organization not found", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown scope name", body = crate::error::ErrorBody)
    )
)]
pub async fn grant_consent(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<GrantConsentRequest>,
) -> Result<(StatusCode, Json<GrantResponse>), AppError> {
    ctx.authorize(Operation::GrantConsent)?;
    let citizen = ctx.require_citizen()?;

    // Validate scopes before touching anything; the offending name is
    // reported back verbatim.
    let scopes = parse_scopes(&body.scopes)?;
    let organization = state
        .organizations
        .require(OrgId::from_uuid(body.organization_id))?;

    let grant = state
        .consents
        .grant(citizen, organization.id, scopes, Utc::now());

    if let Some(pool) = &state.db_pool {
        crate::db::records::save_consent(pool, &grant).await?;
    }
    record_audit(
        &state,
        AuditEvent::new(AuditKind::ConsentGranted, grant.granted_at)
            .actor("citizen")
            .citizen(citizen)
            .organization(organization.id)
            .metadata(serde_json::json!({"scopes": body.scopes}))
            .request_meta(ctx.meta.clone()),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(GrantResponse::from_grant(&state, &grant)),
    ))
}

/// POST /v1/consents/:id/revoke — revoke an owned grant (idempotent).
#[utoipa::path(
    post,
    path = "/v1/consents/{id}/revoke",
    params(("id" = Uuid, Path, description = "Grant id")),
    responses(
        (status = 200, description = "Consent revoked", body = RevokeResponse),
        (status = 404, description = "Grant not found", body = crate::error::ErrorBody)
    )
)]
pub async fn revoke_consent(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<RevokeResponse>, AppError> {
    ctx.authorize(Operation::RevokeConsent)?;
    let citizen = ctx.require_citizen()?;

    let grant = state
        .consents
        .revoke(GrantId::from_uuid(id), citizen, Utc::now())?;

    if let Some(pool) = &state.db_pool {
        crate::db::records::save_consent(pool, &grant).await?;
    }
    record_audit(
        &state,
        AuditEvent::new(
            AuditKind::ConsentRevoked,
            grant.revoked_at.unwrap_or_else(Utc::now),
        )
        .actor("citizen")
        .citizen(citizen)
        .organization(grant.organization_id)
        .metadata(serde_json::json!({"grant_id": grant.id.to_string()}))
        .request_meta(ctx.meta.clone()),
    )
    .await?;

    Ok(Json(RevokeResponse {
        status: "revoked".to_string(),
    }))
}
