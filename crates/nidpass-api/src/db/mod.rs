//! # Database Persistence Layer
//!
//! Optional Postgres mirror of the in-memory stores via SQLx.
//!
//! When `DATABASE_URL` is set, every write a handler performs is mirrored
//! here and the stores are hydrated from these tables at startup. When it
//! is absent the API runs in-memory only — suitable for development and
//! tests, with the caveat that state does not survive restarts.
//!
//! ## Invariant backstop
//!
//! The schema re-declares the invariants the stores enforce in-process:
//! UNIQUE alias tokens, UNIQUE alias slots (partial indexes for the global
//! slot), one consent row per `(citizen, organization)`, UNIQUE NID hashes.
//! Two processes racing on the same slot cannot both commit.
//!
//! ## Write-once tables
//!
//! `verification_history` and `audit_events` accept INSERT only: the
//! module exposes no update or delete function, and the schema installs
//! `BEFORE UPDATE OR DELETE` triggers that raise, so no SQL path —
//! administrative tooling included — can silently alter history.

pub mod audit;
pub mod records;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::state::AppState;

/// Initialize the connection pool and run embedded migrations.
///
/// Returns `None` when `DATABASE_URL` is not set (in-memory-only mode);
/// `Err` when the URL is set but connecting or migrating fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running in-memory only. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Load every table into the in-memory stores on startup.
pub async fn hydrate(state: &AppState, pool: &PgPool) -> Result<(), sqlx::Error> {
    for citizen in records::load_all_citizens(pool).await? {
        if let Err(err) = state.citizens.ingest(citizen) {
            tracing::warn!(error = %err, "skipping citizen row during hydration");
        }
    }
    for org in records::load_all_organizations(pool).await? {
        if let Err(err) = state.organizations.ingest(org) {
            tracing::warn!(error = %err, "skipping organization row during hydration");
        }
    }
    for alias in records::load_all_aliases(pool).await? {
        state.aliases.restore(alias);
    }
    for grant in records::load_all_consents(pool).await? {
        state.consents.restore(grant);
    }
    for record in audit::load_all_verifications(pool).await? {
        state.history.append(record);
    }
    for event in audit::load_all_audit_events(pool).await? {
        state.audit.append(event);
    }

    tracing::info!(
        citizens = state.citizens.len(),
        organizations = state.organizations.len(),
        aliases = state.aliases.len(),
        consents = state.consents.len(),
        history = state.history.len(),
        audit = state.audit.len(),
        "state hydrated from database"
    );
    Ok(())
}
