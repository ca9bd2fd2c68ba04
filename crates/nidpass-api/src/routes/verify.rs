//! Verification routes (org-user role).

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use nidpass_core::{OrgId, Scope};

use crate::auth::{AuthContext, Operation};
use crate::error::AppError;
use crate::state::AppState;

/// Build the verification router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/verify", post(verify))
        .route("/v1/verifications", get(read_history))
}

/// Request to verify a citizen by alias.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// Alias token, bare (`ALIAS-…`) or as scanned (`NID_VERIFY:ALIAS-…`).
    pub alias_token: String,
    /// The verifying organization.
    pub organization_id: Uuid,
}

/// A successful verification response: the scope-filtered disclosure and
/// the scopes that produced it. Nothing outside the granted scopes ever
/// appears in `data`.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    /// The disclosure payload (organization, timestamp, granted attributes).
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub scopes_granted: Vec<String>,
}

/// One verification history entry, as shown to the organization it
/// belongs to.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub id: Uuid,
    pub verified_at: DateTime<Utc>,
    pub status: String,
    /// What was disclosed, verbatim.
    #[schema(value_type = Object)]
    pub disclosed: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citizen_name: Option<String>,
}

/// POST /v1/verify — the verification protocol.
#[utoipa::path(
    post,
    path = "/v1/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Disclosure computed", body = VerifyResponse),
        (status = 404, description = "Unknown alias or organization", body = crate::error::ErrorBody),
        (status = 403, description = "Consent denied", body = crate::error::ErrorBody)
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    ctx.authorize(Operation::Verify)?;

    let outcome = state.engine.verify(
        &body.alias_token,
        OrgId::from_uuid(body.organization_id),
        ctx.meta.clone(),
        Utc::now(),
    )?;

    // Mirror the exact records the engine appended in-memory.
    if let Some(pool) = &state.db_pool {
        crate::db::audit::insert_verification(pool, &outcome.record).await?;
        crate::db::audit::insert_audit_event(pool, &outcome.audit_event).await?;
    }

    Ok(Json(VerifyResponse {
        valid: true,
        data: serde_json::to_value(&outcome.payload)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        scopes_granted: outcome
            .scopes_granted
            .iter()
            .map(|s| Scope::as_str(s).to_string())
            .collect(),
    }))
}

/// GET /v1/verifications — the caller organization's history, newest first.
#[utoipa::path(
    get,
    path = "/v1/verifications",
    responses(
        (status = 200, description = "Verification history", body = [HistoryResponse]),
        (status = 401, description = "Missing organization identity", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not an org user", body = crate::error::ErrorBody)
    )
)]
pub async fn read_history(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Vec<HistoryResponse>>, AppError> {
    ctx.authorize(Operation::ReadHistory)?;
    let organization_id = ctx.require_org()?;

    let entries = state
        .history
        .list_for_org(organization_id)
        .into_iter()
        .map(|record| {
            let citizen_name = state
                .citizens
                .get(record.citizen_id)
                .map(|c| c.full_name);
            HistoryResponse {
                id: record.id,
                verified_at: record.verified_at,
                status: record.status.as_str().to_string(),
                disclosed: record.disclosed,
                citizen_name,
            }
        })
        .collect();
    Ok(Json(entries))
}
