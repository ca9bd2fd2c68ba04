//! Audit log routes (admin role).

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AuthContext, Operation};
use crate::error::AppError;
use crate::state::AppState;

/// Build the audit router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/audit", get(read_audit))
}

/// One audit event, as shown to an admin.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditEventResponse {
    pub id: Uuid,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citizen_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// GET /v1/audit — every audit event, newest first.
#[utoipa::path(
    get,
    path = "/v1/audit",
    responses(
        (status = 200, description = "Audit events", body = [AuditEventResponse]),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody)
    )
)]
pub async fn read_audit(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Vec<AuditEventResponse>>, AppError> {
    ctx.authorize(Operation::ReadAudit)?;

    let events = state
        .audit
        .list()
        .into_iter()
        .map(|event| AuditEventResponse {
            id: event.id,
            kind: event.kind.as_str().to_string(),
            actor: event.actor,
            citizen_id: event.citizen_id.map(|id| *id.as_uuid()),
            organization_id: event.organization_id.map(|id| *id.as_uuid()),
            metadata: event.metadata,
            created_at: event.created_at,
        })
        .collect();
    Ok(Json(events))
}
