//! # nidpass-consent — The Consent Ledger
//!
//! Maps `(citizen, organization)` to the set of attribute scopes the
//! citizen has authorized that organization to see.
//!
//! ## Invariants
//!
//! - At most one grant row per `(citizen, organization)`: re-granting
//!   overwrites scopes and timestamps in place (upsert), it never creates
//!   a second row.
//! - Revocation is soft and idempotent: `is_active` flips off and
//!   `revoked_at` is stamped; the row is never hard-deleted, so the grant
//!   history a citizen sees survives its own revocation.
//! - An inactive grant has no verification effect regardless of its stored
//!   scopes.
//!
//! Grant and revoke for the same pair serialize behind one write lock, so
//! a racing grant/revoke resolves to one of the two outcomes — never a
//! merged state.

mod error;
mod grant;
mod ledger;

pub use error::ConsentError;
pub use grant::ConsentGrant;
pub use ledger::ConsentLedger;
