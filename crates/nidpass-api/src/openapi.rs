//! OpenAPI document generation via utoipa derive macros.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// The generated API document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "nidpass API",
        description = "Privacy-preserving identity verification: alias \
                       minting, consent grants, and consent-scoped \
                       verification with an immutable audit trail.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::aliases::list_aliases,
        crate::routes::aliases::mint_alias,
        crate::routes::aliases::rotate_alias,
        crate::routes::consents::list_consents,
        crate::routes::consents::grant_consent,
        crate::routes::consents::revoke_consent,
        crate::routes::verify::verify,
        crate::routes::verify::read_history,
        crate::routes::audit::read_audit,
        crate::routes::directory::ingest_citizen,
        crate::routes::directory::decide_enrollment,
        crate::routes::directory::ingest_organization,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::aliases::MintAliasRequest,
        crate::routes::aliases::AliasResponse,
        crate::routes::consents::GrantConsentRequest,
        crate::routes::consents::GrantResponse,
        crate::routes::consents::RevokeResponse,
        crate::routes::verify::VerifyRequest,
        crate::routes::verify::VerifyResponse,
        crate::routes::verify::HistoryResponse,
        crate::routes::audit::AuditEventResponse,
        crate::routes::directory::IngestCitizenRequest,
        crate::routes::directory::CitizenResponse,
        crate::routes::directory::EnrollmentDecisionRequest,
        crate::routes::directory::IngestOrganizationRequest,
        crate::routes::directory::OrganizationResponse,
    ))
)]
pub struct ApiDoc;

/// Serve the generated document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
