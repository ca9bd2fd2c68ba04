//! Directory lookup and ingest errors.

use nidpass_core::{CitizenId, OrgId};
use thiserror::Error;

/// Errors from citizen/organization lookups and ingest writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// No citizen with this id.
    #[error("citizen not found: {0}")]
    CitizenNotFound(CitizenId),

    /// No organization with this id.
    #[error("organization not found: {0}")]
    OrganizationNotFound(OrgId),

    /// Another citizen is already enrolled with the same national ID.
    #[error("a citizen with this national ID is already enrolled")]
    DuplicateNid,

    /// Another organization already holds this registration number.
    #[error("an organization with registration number {0:?} already exists")]
    DuplicateRegistration(String),
}
