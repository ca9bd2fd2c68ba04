//! Validation errors raised when constructing core domain values.

use thiserror::Error;

/// A value failed validation at a construction boundary.
///
/// These are client-input errors: reported synchronously, never retried,
/// and they leave no state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A scope name outside the fixed enumerated set. Carries the
    /// offending value so the caller can name it in the rejection.
    #[error("unknown scope: {0:?}")]
    InvalidScope(String),

    /// An alias token that does not match the `ALIAS-` format.
    #[error("malformed alias token: {0:?}")]
    InvalidAliasToken(String),

    /// An enrollment or approval status string outside its enumerated set.
    #[error("unknown status: {0:?}")]
    InvalidStatus(String),

    /// A national ID number that is empty or out of range.
    #[error("invalid national ID number")]
    InvalidNid,
}
