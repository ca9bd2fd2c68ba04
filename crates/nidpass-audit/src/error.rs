//! Audit sink errors.

use thiserror::Error;

/// Errors from the append-only sinks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    /// An attempt was made to alter or remove a stored record. History is
    /// write-once; this is a programmer or tooling error, never a normal
    /// outcome.
    #[error("audit records are immutable; update and delete are not permitted")]
    ImmutableRecord,
}
