//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use nidpass_alias::AliasRegistry;
use nidpass_audit::{AuditLog, VerificationLog};
use nidpass_consent::ConsentLedger;
use nidpass_directory::{CitizenDirectory, OrganizationRegistry};
use nidpass_verify::VerificationEngine;

use crate::config::ApiConfig;

/// Everything a handler needs: the in-memory stores, the verification
/// engine wired over them, and the optional Postgres mirror.
///
/// Stores are authoritative at runtime; when `db_pool` is present every
/// write is mirrored to Postgres and the stores are hydrated from it at
/// startup. Without it the API runs in-memory only (development, tests).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub citizens: Arc<CitizenDirectory>,
    pub organizations: Arc<OrganizationRegistry>,
    pub aliases: Arc<AliasRegistry>,
    pub consents: Arc<ConsentLedger>,
    pub history: Arc<VerificationLog>,
    pub audit: Arc<AuditLog>,
    pub engine: Arc<VerificationEngine>,
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Build a fully wired in-memory state.
    pub fn new(config: ApiConfig) -> Self {
        let citizens = Arc::new(CitizenDirectory::new());
        let organizations = Arc::new(OrganizationRegistry::new());
        let aliases = Arc::new(AliasRegistry::new(
            Arc::clone(&citizens),
            Arc::clone(&organizations),
        ));
        let consents = Arc::new(ConsentLedger::new());
        let history = Arc::new(VerificationLog::new());
        let audit = Arc::new(AuditLog::new());
        let engine = Arc::new(VerificationEngine::new(
            Arc::clone(&citizens),
            Arc::clone(&organizations),
            Arc::clone(&aliases),
            Arc::clone(&consents),
            Arc::clone(&history),
            Arc::clone(&audit),
        ));

        Self {
            config: Arc::new(config),
            citizens,
            organizations,
            aliases,
            consents,
            history,
            audit,
            engine,
            db_pool: None,
        }
    }

    /// Attach a Postgres pool; writes are mirrored from then on.
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}
