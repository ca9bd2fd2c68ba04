//! The verification protocol.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use nidpass_alias::{AliasError, AliasRegistry};
use nidpass_audit::{
    AuditEvent, AuditKind, AuditLog, RequestMeta, VerificationLog, VerificationRecord,
    VerificationStatus,
};
use nidpass_consent::ConsentLedger;
use nidpass_core::{OrgId, Scope};
use nidpass_directory::{CitizenDirectory, OrganizationRegistry};

use crate::disclosure::DisclosurePayload;

/// Verification failures, distinct by design: a caller can tell "no such
/// alias" (404) from "exists but not consented" (403). The existence leak
/// is accepted for debuggability; the boundary is expected to rate-limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The token is malformed or resolves to no alias.
    #[error("invalid or unknown alias token")]
    AliasNotFound,

    /// The verifying organization does not exist.
    #[error("organization not found: {0}")]
    OrganizationNotFound(OrgId),

    /// The citizen has no active consent grant for this organization.
    #[error("citizen has not granted consent to this organization")]
    ConsentDenied,
}

/// A successful verification: the disclosure, the scopes that shaped it,
/// and the records the engine appended — returned so the persistence
/// boundary can mirror exactly what was stored in-memory, ids included.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub payload: DisclosurePayload,
    pub scopes_granted: BTreeSet<Scope>,
    pub record: VerificationRecord,
    pub audit_event: AuditEvent,
}

/// Executes the verification protocol over the platform stores.
///
/// Reads the alias registry, organization registry, and consent ledger;
/// writes only the two append-only sinks. Nothing here mutates alias or
/// consent state, so concurrent verifications — even of the same alias —
/// need no ordering.
pub struct VerificationEngine {
    citizens: Arc<CitizenDirectory>,
    organizations: Arc<OrganizationRegistry>,
    aliases: Arc<AliasRegistry>,
    consents: Arc<ConsentLedger>,
    history: Arc<VerificationLog>,
    audit: Arc<AuditLog>,
}

impl VerificationEngine {
    pub fn new(
        citizens: Arc<CitizenDirectory>,
        organizations: Arc<OrganizationRegistry>,
        aliases: Arc<AliasRegistry>,
        consents: Arc<ConsentLedger>,
        history: Arc<VerificationLog>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            citizens,
            organizations,
            aliases,
            consents,
            history,
            audit,
        }
    }

    /// Verify an alias for an organization and disclose what consent
    /// covers.
    ///
    /// The consent gate runs before any citizen attribute is read. Failure
    /// paths write no history record.
    ///
    /// # Errors
    ///
    /// [`VerifyError::AliasNotFound`], [`VerifyError::OrganizationNotFound`],
    /// [`VerifyError::ConsentDenied`].
    pub fn verify(
        &self,
        raw_token: &str,
        organization_id: OrgId,
        request_meta: RequestMeta,
        at: DateTime<Utc>,
    ) -> Result<VerificationOutcome, VerifyError> {
        // Steps 1–2: normalize and resolve the alias.
        let alias = self.aliases.lookup(raw_token).map_err(|err| match err {
            AliasError::UnknownToken => {
                tracing::warn!(organization = %organization_id, "verification failed: unknown alias token");
                VerifyError::AliasNotFound
            }
            // lookup() only ever reports UnknownToken.
            _ => VerifyError::AliasNotFound,
        })?;

        // Step 3: resolve the organization.
        let organization = self
            .organizations
            .get(organization_id)
            .ok_or(VerifyError::OrganizationNotFound(organization_id))?;

        // Step 4: the access-control gate. Checked before any attribute
        // of the citizen is touched.
        let Some(grant) = self.consents.active_grant(alias.citizen_id, organization_id) else {
            tracing::warn!(
                organization = %organization_id,
                alias = %alias.id,
                "verification denied: no active consent grant"
            );
            return Err(VerifyError::ConsentDenied);
        };

        // Step 5: derive the disclosure from the granted scopes only.
        let citizen = match self.citizens.get(alias.citizen_id) {
            Some(c) => c,
            None => {
                // An alias whose citizen is gone behaves like a dead token.
                tracing::warn!(alias = %alias.id, "alias resolves to a missing citizen");
                return Err(VerifyError::AliasNotFound);
            }
        };
        let payload = DisclosurePayload::build(&citizen, &organization.name, &grant.scopes, at);

        // Step 6: one immutable history record of what actually left.
        let disclosed = serde_json::to_value(&payload)
            .expect("disclosure payload serialization is infallible");
        let record = VerificationRecord {
            id: Uuid::new_v4(),
            organization_id,
            citizen_id: citizen.id,
            status: VerificationStatus::Success,
            disclosed,
            verified_at: at,
            meta: request_meta.clone(),
        };
        let audit_event = AuditEvent::new(AuditKind::VerificationCompleted, at)
            .citizen(citizen.id)
            .organization(organization_id)
            .metadata(serde_json::json!({
                "scopes": grant.scopes.iter().map(Scope::as_str).collect::<Vec<_>>(),
            }))
            .request_meta(request_meta);
        self.history.append(record.clone());
        self.audit.append(audit_event.clone());

        // Step 7: payload plus the echoed scope list.
        Ok(VerificationOutcome {
            payload,
            scopes_granted: grant.scopes,
            record,
            audit_event,
        })
    }
}
