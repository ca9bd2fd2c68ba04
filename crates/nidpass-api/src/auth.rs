//! # Role Policy and Auth Context
//!
//! Login, sessions, and token issuance live in an external identity
//! gateway; by the time a request reaches this service the gateway has
//! stamped it with headers naming the caller:
//!
//! - `x-nidpass-role`: `CITIZEN`, `ORG_USER`, or `ADMIN`
//! - `x-nidpass-citizen-id`: the caller's citizen id (citizens only)
//! - `x-nidpass-org-id`: the caller's organization id (org users only)
//!
//! Authorization is a single policy table keyed by `(Role, Operation)`,
//! evaluated once where the handler declares its operation — there are no
//! role comparisons inside business logic.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use nidpass_audit::RequestMeta;
use nidpass_core::{CitizenId, OrgId};

use crate::error::AppError;

/// The caller's role, as asserted by the identity gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Citizen,
    OrgUser,
    Admin,
}

impl Role {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "CITIZEN" => Some(Role::Citizen),
            "ORG_USER" => Some(Role::OrgUser),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Every operation the API exposes, for policy purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListAliases,
    MintAlias,
    RotateAlias,
    ListConsents,
    GrantConsent,
    RevokeConsent,
    Verify,
    ReadHistory,
    ReadAudit,
    IngestCitizen,
    DecideEnrollment,
    IngestOrganization,
}

/// The policy table: which role may perform which operation.
///
/// Citizens manage their own aliases and consents; org users verify and
/// read their history; admins operate the ingest boundary and read audit.
fn allows(role: Role, operation: Operation) -> bool {
    use Operation::*;
    match role {
        Role::Citizen => matches!(
            operation,
            ListAliases | MintAlias | RotateAlias | ListConsents | GrantConsent | RevokeConsent
        ),
        Role::OrgUser => matches!(operation, Verify | ReadHistory),
        Role::Admin => matches!(
            operation,
            ReadAudit | IngestCitizen | DecideEnrollment | IngestOrganization
        ),
    }
}

/// The authenticated caller, extracted from gateway headers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub role: Role,
    pub citizen_id: Option<CitizenId>,
    pub org_id: Option<OrgId>,
    pub meta: RequestMeta,
}

impl AuthContext {
    /// Gate an operation on the policy table.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] when the caller's role may not
    /// perform `operation`.
    pub fn authorize(&self, operation: Operation) -> Result<(), AppError> {
        if allows(self.role, operation) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role is not permitted to perform {operation:?}"
            )))
        }
    }

    /// The caller's citizen id, required for citizen operations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] when the gateway did not supply
    /// one.
    pub fn require_citizen(&self) -> Result<CitizenId, AppError> {
        self.citizen_id
            .ok_or_else(|| AppError::Unauthorized("missing citizen identity".into()))
    }

    /// The caller's organization id, required for org-user operations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] when the gateway did not supply
    /// one.
    pub fn require_org(&self) -> Result<OrgId, AppError> {
        self.org_id
            .ok_or_else(|| AppError::Unauthorized("missing organization identity".into()))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = header_str(parts, "x-nidpass-role")
            .and_then(Role::parse)
            .ok_or_else(|| AppError::Unauthorized("missing or unknown role".into()))?;

        let citizen_id = header_str(parts, "x-nidpass-citizen-id")
            .map(|raw| {
                raw.parse::<CitizenId>()
                    .map_err(|_| AppError::Unauthorized("malformed citizen id".into()))
            })
            .transpose()?;
        let org_id = header_str(parts, "x-nidpass-org-id")
            .map(|raw| {
                raw.parse::<OrgId>()
                    .map_err(|_| AppError::Unauthorized("malformed organization id".into()))
            })
            .transpose()?;

        let meta = RequestMeta {
            ip_address: header_str(parts, "x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse().ok()),
            user_agent: header_str(parts, "user-agent").map(str::to_string),
        };

        Ok(AuthContext {
            role,
            citizen_id,
            org_id,
            meta,
        })
    }
}
