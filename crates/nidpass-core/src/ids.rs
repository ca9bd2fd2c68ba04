//! UUID-based identifier newtypes.
//!
//! Always valid by construction. One type per entity so the compiler keeps
//! citizen, organization, alias, and grant identifiers from crossing wires.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// Identifier of an enrolled citizen. Owned by the enrollment workflow;
    /// the verification core only ever reads citizens by this id.
    CitizenId
}

uuid_id! {
    /// Identifier of a verifier organization (bank, telecom, agency).
    OrgId
}

uuid_id! {
    /// Row identifier of an alias. Distinct from the alias *token*: the id
    /// is stable across rotations, the token is not.
    AliasId
}

uuid_id! {
    /// Identifier of a consent grant row.
    GrantId
}
