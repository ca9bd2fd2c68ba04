//! The disclosure payload.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use nidpass_core::Scope;
use nidpass_directory::CitizenIdentity;

use crate::age::is_over_18;

/// The scope-filtered attribute set returned by a verification.
///
/// The type is closed: beyond the organization name and timestamp, it has
/// exactly one optional field per scope, each omitted from JSON when not
/// granted. Attributes outside the four scopes are not representable here,
/// so nothing else can leak into a response — whatever a caller asks for.
#[derive(Debug, Clone, Serialize)]
pub struct DisclosurePayload {
    /// Name of the verifying organization.
    pub organization: String,
    /// When the disclosure was computed.
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_over_18: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residency_district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_verified: Option<bool>,
}

impl DisclosurePayload {
    /// Derive the payload for `citizen` under `scopes`, as disclosed to
    /// `organization_name` at `at`.
    pub fn build(
        citizen: &CitizenIdentity,
        organization_name: &str,
        scopes: &BTreeSet<Scope>,
        at: DateTime<Utc>,
    ) -> Self {
        let mut payload = Self {
            organization: organization_name.to_string(),
            timestamp: at,
            full_name: None,
            age_over_18: None,
            residency_district: None,
            phone_verified: None,
        };

        for scope in scopes {
            match scope {
                Scope::NameMatch => payload.full_name = Some(citizen.full_name.clone()),
                Scope::AgeOver18 => {
                    payload.age_over_18 =
                        Some(is_over_18(citizen.date_of_birth, at.date_naive()));
                }
                Scope::ResidencyDistrict => {
                    payload.residency_district = Some(citizen.residency_district.clone());
                }
                Scope::PhoneVerified => payload.phone_verified = Some(citizen.phone_verified),
            }
        }

        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nidpass_core::{hash_nid, CitizenId, EnrollmentStatus};

    fn citizen() -> CitizenIdentity {
        let now = Utc::now();
        CitizenIdentity {
            id: CitizenId::new(),
            full_name: "Amina Rahman".into(),
            nid_hash: hash_nid("1234567890123", "test-salt").unwrap(),
            date_of_birth: NaiveDate::from_ymd_opt(2006, 6, 15).unwrap(),
            residency_district: "Dhanmondi".into(),
            phone_verified: true,
            enrollment_status: EnrollmentStatus::Approved,
            created_at: now,
            updated_at: now,
        }
    }

    fn scopes(list: &[Scope]) -> BTreeSet<Scope> {
        list.iter().copied().collect()
    }

    #[test]
    fn discloses_exactly_the_granted_scopes() {
        let payload = DisclosurePayload::build(
            &citizen(),
            "City Bank",
            &scopes(&[Scope::NameMatch, Scope::PhoneVerified]),
            Utc::now(),
        );

        assert_eq!(payload.full_name.as_deref(), Some("Amina Rahman"));
        assert_eq!(payload.phone_verified, Some(true));
        assert!(payload.age_over_18.is_none());
        assert!(payload.residency_district.is_none());
    }

    #[test]
    fn age_only_grant_leaks_nothing_else() {
        let payload = DisclosurePayload::build(
            &citizen(),
            "City Bank",
            &scopes(&[Scope::AgeOver18]),
            Utc::now(),
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("age_over_18").is_some());
        assert!(json.get("full_name").is_none());
        assert!(json.get("residency_district").is_none());
        assert!(json.get("phone_verified").is_none());
        // Only organization, timestamp, and the one granted attribute.
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn empty_scope_set_discloses_only_envelope() {
        let payload =
            DisclosurePayload::build(&citizen(), "City Bank", &BTreeSet::new(), Utc::now());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert_eq!(json["organization"], "City Bank");
    }

    #[test]
    fn age_uses_the_disclosure_date() {
        let dob_citizen = citizen(); // born 2006-06-15
        let before = DateTime::parse_from_rfc3339("2024-06-14T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let on = DateTime::parse_from_rfc3339("2024-06-15T00:00:01Z")
            .unwrap()
            .with_timezone(&Utc);

        let p1 =
            DisclosurePayload::build(&dob_citizen, "X", &scopes(&[Scope::AgeOver18]), before);
        assert_eq!(p1.age_over_18, Some(false));

        let p2 = DisclosurePayload::build(&dob_citizen, "X", &scopes(&[Scope::AgeOver18]), on);
        assert_eq!(p2.age_over_18, Some(true));
    }
}
