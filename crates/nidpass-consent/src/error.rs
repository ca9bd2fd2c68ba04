//! Consent ledger errors.

use nidpass_core::GrantId;
use thiserror::Error;

/// Errors from consent mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsentError {
    /// The grant does not exist — or does not belong to the acting
    /// citizen. The two cases are deliberately indistinguishable so a
    /// citizen cannot probe for other citizens' grant ids.
    #[error("consent grant not found: {0}")]
    GrantNotFound(GrantId),
}
