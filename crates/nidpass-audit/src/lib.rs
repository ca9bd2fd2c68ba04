//! # nidpass-audit — Append-Only History and Audit Sinks
//!
//! Two write-once stores:
//!
//! - [`VerificationLog`]: one record per successful disclosure, readable by
//!   the organization it belongs to.
//! - [`AuditLog`]: process-wide record of sensitive actions (enrollment
//!   decisions, consent changes, alias events, verification outcomes).
//!
//! ## Immutability
//!
//! The store internals expose only append and read — there is no code path
//! that alters a stored record. `update`/`delete` entry points exist so
//! administrative tooling has something to call, and they fail with
//! [`AuditError::ImmutableRecord`] unconditionally, loudly. The Postgres
//! mirror backs this with `BEFORE UPDATE OR DELETE` triggers that raise.
//!
//! Records reference citizens and organizations by id but must outlive
//! them: the storage schema nulls the reference on delete instead of
//! cascading.

mod error;
mod event;
mod history;

pub use error::AuditError;
pub use event::{AuditEvent, AuditKind, AuditLog};
pub use history::{RequestMeta, VerificationLog, VerificationRecord, VerificationStatus};
