//! Alias management routes (citizen role).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use nidpass_alias::{AliasIdentifier, AliasKind};
use nidpass_audit::{AuditEvent, AuditKind};
use nidpass_core::AliasId;

use crate::auth::{AuthContext, Operation};
use crate::error::AppError;
use crate::routes::record_audit;
use crate::state::AppState;

/// Build the alias router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/aliases", get(list_aliases).post(mint_alias))
        .route("/v1/aliases/:id/rotate", post(rotate_alias))
}

/// Request to mint an alias.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MintAliasRequest {
    /// `GLOBAL` or `PAIRWISE`.
    pub kind: String,
    /// Target organization; required for pairwise, forbidden for global.
    #[serde(default)]
    pub organization_id: Option<Uuid>,
}

/// An alias as returned to its owning citizen.
#[derive(Debug, Serialize, ToSchema)]
pub struct AliasResponse {
    pub id: Uuid,
    pub kind: String,
    /// The disclosable token, e.g. `ALIAS-94D1F0A2B3C4`.
    pub token: String,
    /// QR payload form of the token.
    pub scan_payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotated_at: Option<DateTime<Utc>>,
}

impl AliasResponse {
    fn from_alias(state: &AppState, alias: &AliasIdentifier) -> Self {
        let organization_name = alias
            .organization_id
            .and_then(|id| state.organizations.get(id))
            .map(|org| org.name);
        Self {
            id: *alias.id.as_uuid(),
            kind: alias.kind.as_str().to_string(),
            token: alias.token.as_str().to_string(),
            scan_payload: alias.token.to_scan_payload(),
            organization_id: alias.organization_id.map(|id| *id.as_uuid()),
            organization_name,
            created_at: alias.created_at,
            rotated_at: alias.rotated_at,
        }
    }
}

fn parse_kind(raw: &str) -> Result<AliasKind, AppError> {
    match raw {
        "GLOBAL" => Ok(AliasKind::Global),
        "PAIRWISE" => Ok(AliasKind::Pairwise),
        other => Err(AppError::Validation(format!("unknown alias kind: {other:?}"))),
    }
}

/// GET /v1/aliases — the caller's aliases, newest first.
#[utoipa::path(
    get,
    path = "/v1/aliases",
    responses(
        (status = 200, description = "The caller's aliases", body = [AliasResponse]),
        (status = 401, description = "Missing auth context", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not a citizen", body = crate::error::ErrorBody)
    )
)]
pub async fn list_aliases(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Vec<AliasResponse>>, AppError> {
    ctx.authorize(Operation::ListAliases)?;
    let citizen = ctx.require_citizen()?;

    let aliases = state
        .aliases
        .list_for_citizen(citizen)
        .iter()
        .map(|a| AliasResponse::from_alias(&state, a))
        .collect();
    Ok(Json(aliases))
}

/// POST /v1/aliases — mint an alias (idempotent per slot).
///
/// Returns 201 when a fresh alias was created, 200 with the existing alias
/// when the slot was already occupied.
#[utoipa::path(
    post,
    path = "/v1/aliases",
    request_body = MintAliasRequest,
    responses(
        (status = 201, description = "Alias created", body = AliasResponse),
        (status = 200, description = "Existing alias returned", body = AliasResponse),
        (status = 403, description = "Enrollment not approved", body = crate::error::ErrorBody),
        (status = 404, description = "Organization not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid alias specification", body = crate::error::ErrorBody)
    )
)]
pub async fn mint_alias(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<MintAliasRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Operation::MintAlias)?;
    let citizen = ctx.require_citizen()?;
    let kind = parse_kind(&body.kind)?;
    let organization_id = body.organization_id.map(nidpass_core::OrgId::from_uuid);

    let outcome = state
        .aliases
        .mint(citizen, kind, organization_id, Utc::now())?;
    let alias = outcome.alias().clone();

    if outcome.is_fresh() {
        if let Some(pool) = &state.db_pool {
            crate::db::records::save_alias(pool, &alias).await?;
        }
        record_audit(
            &state,
            AuditEvent::new(AuditKind::AliasGenerated, alias.created_at)
                .actor("citizen")
                .citizen(citizen)
                .metadata(serde_json::json!({
                    "alias_id": alias.id.to_string(),
                    "kind": alias.kind.as_str(),
                }))
                .request_meta(ctx.meta.clone()),
        )
        .await?;
    }

    let status = if outcome.is_fresh() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(AliasResponse::from_alias(&state, &alias))))
}

/// POST /v1/aliases/:id/rotate — replace the token of an owned alias.
#[utoipa::path(
    post,
    path = "/v1/aliases/{id}/rotate",
    params(("id" = Uuid, Path, description = "Alias row id")),
    responses(
        (status = 200, description = "Alias rotated", body = AliasResponse),
        (status = 404, description = "Alias not found", body = crate::error::ErrorBody)
    )
)]
pub async fn rotate_alias(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<AliasResponse>, AppError> {
    ctx.authorize(Operation::RotateAlias)?;
    let citizen = ctx.require_citizen()?;

    let rotated = state
        .aliases
        .rotate(AliasId::from_uuid(id), citizen, Utc::now())?;

    if let Some(pool) = &state.db_pool {
        crate::db::records::save_alias(pool, &rotated).await?;
    }
    record_audit(
        &state,
        AuditEvent::new(
            AuditKind::AliasRotated,
            rotated.rotated_at.unwrap_or_else(Utc::now),
        )
        .actor("citizen")
        .citizen(citizen)
        .metadata(serde_json::json!({"alias_id": rotated.id.to_string()}))
        .request_meta(ctx.meta.clone()),
    )
    .await?;

    Ok(Json(AliasResponse::from_alias(&state, &rotated)))
}
