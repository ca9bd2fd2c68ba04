//! # nidpass-alias — The Alias Registry
//!
//! Mints and resolves the pseudonymous identifiers citizens disclose in
//! place of their real identity. Two kinds exist:
//!
//! - **Global**: one per citizen, reusable with any organization.
//! - **Pairwise**: one per `(citizen, organization)`, so two organizations
//!   comparing tokens learn nothing about whether they serve the same
//!   citizen.
//!
//! ## Invariants
//!
//! - A token resolves to at most one alias, ever (global token uniqueness).
//! - At most one alias exists per `(citizen, kind, organization)` slot;
//!   minting into an occupied slot returns the existing alias unchanged.
//! - Only citizens with an approved enrollment may mint.
//! - Rotation replaces the token and stamps `rotated_at` under one write
//!   lock: there is no window in which both the old and new token resolve.
//!
//! The registry's lock makes these invariants hold in-process; the
//! persistence layer re-declares them as UNIQUE constraints so concurrent
//! processes cannot violate them either.

mod error;
mod model;
mod registry;

pub use error::AliasError;
pub use model::{AliasIdentifier, AliasKind};
pub use registry::{AliasRegistry, MintOutcome};
