//! # nidpass-directory — Citizen and Organization Records
//!
//! Holds the identity facts the verification core consumes: enrolled
//! citizens (name, date of birth, residency, phone-verification flag,
//! salted NID hash, enrollment status) and verifier organizations
//! (approval status, active flag).
//!
//! ## Ownership
//!
//! Both record kinds are **external-owned**: the enrollment workflow writes
//! citizens, the organization onboarding workflow writes organizations. The
//! alias registry and verification engine only ever read them. Writes enter
//! through the ingest methods on the stores, which exist solely as the
//! boundary those external workflows call.
//!
//! ## Concurrency
//!
//! Each store keeps its primary map and uniqueness index behind one
//! `RwLock`, so check-then-insert (duplicate NID hash, duplicate
//! registration number) is atomic under concurrent ingest.

mod citizen;
mod error;
mod organization;

pub use citizen::{CitizenDirectory, CitizenIdentity};
pub use error::DirectoryError;
pub use organization::{Organization, OrganizationRegistry};
