//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing an `AccountId` where an `ItemId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
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
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(BuildingId, "Unique identifier for a building (the owning ledger scope).");
typed_id!(UnitId, "Unique identifier for a rentable unit inside a building.");
typed_id!(UserId, "Unique identifier for the acting user.");
typed_id!(
    PartyId,
    "Unique identifier for a counterpart party (customer or vendor)."
);
typed_id!(AccountId, "Unique identifier for a chart of accounts entry.");
typed_id!(AccountTypeId, "Unique identifier for an account type.");
typed_id!(ItemId, "Unique identifier for a product or service item.");
typed_id!(TransactionId, "Unique identifier for a ledger transaction header.");
typed_id!(SplitId, "Unique identifier for a ledger split.");
typed_id!(DocumentId, "Unique identifier for a business document.");
typed_id!(DocumentLineId, "Unique identifier for a document line item.");
typed_id!(
    AppliedCreditId,
    "Unique identifier for a credit memo applied to an invoice."
);
