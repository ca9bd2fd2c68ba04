//! Enrollment and approval status enums.
//!
//! Both are written by external workflows (enrollment review, organization
//! onboarding) and read by the verification core as preconditions.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Where a citizen stands in the enrollment workflow.
///
/// Only `Approved` citizens may mint aliases; the enrollment workflow owns
/// the transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Approved => "APPROVED",
            EnrollmentStatus::Rejected => "REJECTED",
        }
    }

    /// Parse the wire/storage form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStatus`] for anything outside the
    /// three known values.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "PENDING" => Ok(EnrollmentStatus::Pending),
            "APPROVED" => Ok(EnrollmentStatus::Approved),
            "REJECTED" => Ok(EnrollmentStatus::Rejected),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an organization stands in the onboarding workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl OrgApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgApprovalStatus::Pending => "PENDING",
            OrgApprovalStatus::Approved => "APPROVED",
            OrgApprovalStatus::Rejected => "REJECTED",
        }
    }

    /// Parse the wire/storage form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStatus`] for anything outside the
    /// three known values.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "PENDING" => Ok(OrgApprovalStatus::Pending),
            "APPROVED" => Ok(OrgApprovalStatus::Approved),
            "REJECTED" => Ok(OrgApprovalStatus::Rejected),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrgApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
