//! # nidpass-api — Axum API Services
//!
//! The HTTP surface over the nidpass verification core.
//!
//! ## API Surface
//!
//! | Prefix | Module | Role |
//! |---|---|---|
//! | `/v1/aliases*` | [`routes::aliases`] | citizen |
//! | `/v1/consents*` | [`routes::consents`] | citizen |
//! | `/v1/verify`, `/v1/verifications` | [`routes::verify`] | org user |
//! | `/v1/audit` | [`routes::audit`] | admin |
//! | `/v1/citizens*`, `/v1/organizations` | [`routes::directory`] | admin |
//! | `/openapi.json` | [`openapi`] | — |
//! | `/health/*` | here | — |
//!
//! ## Authorization
//!
//! The external identity gateway asserts the caller via headers; every
//! handler evaluates one `(role, operation)` policy-table entry at entry.
//! See [`auth`].
//!
//! ## Persistence
//!
//! In-memory stores are authoritative; with `DATABASE_URL` set they are
//! mirrored to Postgres and hydrated back at startup. See [`db`].

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
///
/// Health probes and `/openapi.json` sit outside the role-checked surface
/// so probes and tooling need no gateway headers.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::aliases::router())
        .merge(routes::consents::router())
        .merge(routes::verify::router())
        .merge(routes::audit::router())
        .merge(routes::directory::router())
        .merge(openapi::router())
        // 2 MiB request cap: every legitimate body here is tiny.
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(probes).merge(api)
}

/// Liveness probe — 200 whenever the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the stores are reachable and, when
/// configured, that the database answers.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // Store locks acquirable (not deadlocked).
    let _ = state.citizens.len();
    let _ = state.organizations.len();
    let _ = state.aliases.len();
    let _ = state.consents.len();
    let _ = state.history.len();
    let _ = state.audit.len();

    if let Some(pool) = &state.db_pool {
        if let Err(err) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!(error = %err, "database health check failed");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
