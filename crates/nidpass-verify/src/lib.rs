//! # nidpass-verify — The Verification Engine
//!
//! The central protocol of the platform. Given an alias token and a
//! verifying organization, the engine:
//!
//! 1. normalizes the token (QR scan marker stripped),
//! 2. resolves the alias to a citizen,
//! 3. resolves the organization,
//! 4. gates on an **active consent grant** — before any attribute is read,
//! 5. builds a disclosure payload limited to the granted scopes,
//! 6. appends one immutable history record,
//! 7. returns the payload with the granted scopes echoed.
//!
//! Verification never mutates alias or consent state: it is reads plus one
//! append, so concurrent verifications need no coordination.
//!
//! Failed verifications (unknown alias, unknown organization, no consent)
//! write no history record; they surface as distinct errors and a
//! `tracing` warning for boundary monitoring.

mod age;
mod disclosure;
mod engine;

pub use age::is_over_18;
pub use disclosure::DisclosurePayload;
pub use engine::{VerificationEngine, VerificationOutcome, VerifyError};
