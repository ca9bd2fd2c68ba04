//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from the alias registry, consent ledger, directory,
//! and verification engine to HTTP status codes and machine-readable codes.
//! Internal error details are never exposed in responses.
//!
//! Not-found and denial outcomes deliberately carry distinct codes
//! (`ALIAS_NOT_FOUND` 404 vs `CONSENT_DENIED` 403): callers can tell
//! "doesn't exist" from "exists but denied". The anti-enumeration cost of
//! that choice is accepted and expected to be rate-limited at the boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use nidpass_alias::AliasError;
use nidpass_audit::AuditError;
use nidpass_consent::ConsentError;
use nidpass_core::ValidationError;
use nidpass_directory::DirectoryError;
use nidpass_verify::VerifyError;

/// Structured JSON error response body, shared by every error the API
/// returns.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable code (e.g. "CONSENT_DENIED", "INVALID_SCOPE").
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Application-level error type mapped onto HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Citizen enrollment not approved — alias operations refused (403).
    #[error("identity must be verified before generating an alias")]
    NotVerified,

    /// Organization presence did not match the alias kind (422).
    #[error("invalid alias specification: {0}")]
    InvalidAliasSpec(String),

    /// A scope name outside the enumerated set, named in full (422).
    #[error("unknown scope: {0:?}")]
    InvalidScope(String),

    /// Unknown organization (404).
    #[error("organization not found")]
    OrganizationNotFound,

    /// Malformed or unknown alias token (404).
    #[error("invalid or unknown alias token")]
    AliasNotFound,

    /// No active consent grant for this citizen/organization pair (403).
    #[error("access denied: citizen has not granted consent to this organization")]
    ConsentDenied,

    /// Unknown grant, or a grant owned by someone else (404).
    #[error("consent grant not found")]
    GrantNotFound,

    /// Unknown citizen (404).
    #[error("citizen not found")]
    CitizenNotFound,

    /// A citizen with the same national ID is already enrolled (409).
    #[error("a citizen with this national ID is already enrolled")]
    DuplicateNid,

    /// Registration number already taken by another organization (409).
    #[error("an organization with this registration number already exists")]
    DuplicateRegistration,

    /// Attempted mutation of a write-once record (409). A programmer or
    /// tooling error — logged loudly, never silently ignored.
    #[error("record is immutable")]
    ImmutableRecord,

    /// Missing or unusable auth context (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller's role may not perform this operation (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotVerified => (StatusCode::FORBIDDEN, "NOT_VERIFIED"),
            Self::InvalidAliasSpec(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ALIAS_SPEC"),
            Self::InvalidScope(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_SCOPE"),
            Self::OrganizationNotFound => (StatusCode::NOT_FOUND, "ORGANIZATION_NOT_FOUND"),
            Self::AliasNotFound => (StatusCode::NOT_FOUND, "ALIAS_NOT_FOUND"),
            Self::ConsentDenied => (StatusCode::FORBIDDEN, "CONSENT_DENIED"),
            Self::GrantNotFound => (StatusCode::NOT_FOUND, "GRANT_NOT_FOUND"),
            Self::CitizenNotFound => (StatusCode::NOT_FOUND, "CITIZEN_NOT_FOUND"),
            Self::DuplicateNid => (StatusCode::CONFLICT, "DUPLICATE_NID"),
            Self::DuplicateRegistration => (StatusCode::CONFLICT, "DUPLICATE_REGISTRATION"),
            Self::ImmutableRecord => (StatusCode::CONFLICT, "IMMUTABLE_RECORD"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ImmutableRecord => {
                tracing::error!(error = %self, "attempted mutation of an immutable record")
            }
            Self::ConsentDenied => tracing::warn!(error = %self, "verification denied"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidScope(name) => Self::InvalidScope(name),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<AliasError> for AppError {
    fn from(err: AliasError) -> Self {
        match err {
            AliasError::NotVerified => Self::NotVerified,
            AliasError::CitizenNotFound(_) => Self::CitizenNotFound,
            AliasError::InvalidSpec(msg) => Self::InvalidAliasSpec(msg),
            AliasError::OrganizationNotFound(_) => Self::OrganizationNotFound,
            AliasError::UnknownToken => Self::AliasNotFound,
            AliasError::AliasNotFound(_) => Self::AliasNotFound,
        }
    }
}

impl From<ConsentError> for AppError {
    fn from(err: ConsentError) -> Self {
        match err {
            ConsentError::GrantNotFound(_) => Self::GrantNotFound,
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::CitizenNotFound(_) => Self::CitizenNotFound,
            DirectoryError::OrganizationNotFound(_) => Self::OrganizationNotFound,
            DirectoryError::DuplicateNid => Self::DuplicateNid,
            DirectoryError::DuplicateRegistration(_) => Self::DuplicateRegistration,
        }
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::AliasNotFound => Self::AliasNotFound,
            VerifyError::OrganizationNotFound(_) => Self::OrganizationNotFound,
            VerifyError::ConsentDenied => Self::ConsentDenied,
        }
    }
}

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::ImmutableRecord => Self::ImmutableRecord,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes_match_the_contract() {
        let cases: [(AppError, StatusCode, &str); 9] = [
            (AppError::NotVerified, StatusCode::FORBIDDEN, "NOT_VERIFIED"),
            (
                AppError::InvalidAliasSpec("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_ALIAS_SPEC",
            ),
            (
                AppError::InvalidScope("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_SCOPE",
            ),
            (
                AppError::OrganizationNotFound,
                StatusCode::NOT_FOUND,
                "ORGANIZATION_NOT_FOUND",
            ),
            (AppError::AliasNotFound, StatusCode::NOT_FOUND, "ALIAS_NOT_FOUND"),
            (AppError::ConsentDenied, StatusCode::FORBIDDEN, "CONSENT_DENIED"),
            (AppError::GrantNotFound, StatusCode::NOT_FOUND, "GRANT_NOT_FOUND"),
            (
                AppError::ImmutableRecord,
                StatusCode::CONFLICT,
                "IMMUTABLE_RECORD",
            ),
            (
                AppError::Unauthorized("no role".into()),
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
            ),
        ];
        for (err, status, code) in cases {
            let (s, c) = err.status_and_code();
            assert_eq!(s, status);
            assert_eq!(c, code);
        }
    }

    #[test]
    fn alias_not_found_and_consent_denied_stay_distinct() {
        // The existence-leak trade-off is deliberate; the codes must not
        // silently merge.
        assert_ne!(
            AppError::AliasNotFound.status_and_code(),
            AppError::ConsentDenied.status_and_code()
        );
    }

    #[tokio::test]
    async fn invalid_scope_names_the_offender() {
        let (status, body) = response_parts(AppError::InvalidScope("blood_type".into())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "INVALID_SCOPE");
        assert!(body.error.message.contains("blood_type"));
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("db connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(!body.error.message.contains("db connection"));
    }

    #[test]
    fn scope_validation_maps_to_invalid_scope() {
        let err = AppError::from(ValidationError::InvalidScope("nid_number".into()));
        assert!(matches!(err, AppError::InvalidScope(ref s) if s == "nid_number"));
    }

    #[test]
    fn domain_errors_map_to_contract_codes() {
        assert!(matches!(
            AppError::from(AliasError::NotVerified),
            AppError::NotVerified
        ));
        assert!(matches!(
            AppError::from(AliasError::UnknownToken),
            AppError::AliasNotFound
        ));
        assert!(matches!(
            AppError::from(VerifyError::ConsentDenied),
            AppError::ConsentDenied
        ));
        assert!(matches!(
            AppError::from(AuditError::ImmutableRecord),
            AppError::ImmutableRecord
        ));
        assert!(matches!(
            AppError::from(DirectoryError::DuplicateNid),
            AppError::DuplicateNid
        ));
    }
}
