//! # nidpass-core — Domain Primitives
//!
//! Shared vocabulary for the nidpass stack. Each identifier is a distinct
//! newtype — you cannot pass an [`OrgId`] where a [`CitizenId`] is expected —
//! and every string-shaped value that crosses a trust boundary (alias
//! tokens, scope names) validates at construction time.
//!
//! ## What lives here
//!
//! - UUID identifier newtypes: [`CitizenId`], [`OrgId`], [`AliasId`],
//!   [`GrantId`]
//! - [`AliasToken`]: the opaque pseudonymous identifier, with scan-prefix
//!   normalization
//! - [`Scope`]: the closed set of disclosable attribute categories
//! - [`EnrollmentStatus`] / [`OrgApprovalStatus`]
//! - [`NidHash`]: salted one-way hash of a national ID number
//!
//! Nothing in this crate performs IO or holds state.

mod error;
mod ids;
mod nid;
mod scope;
mod status;
mod token;

pub use error::ValidationError;
pub use ids::{AliasId, CitizenId, GrantId, OrgId};
pub use nid::{hash_nid, NidHash};
pub use scope::Scope;
pub use status::{EnrollmentStatus, OrgApprovalStatus};
pub use token::{AliasToken, SCAN_PREFIX};
