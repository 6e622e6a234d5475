//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `ChequeId` where an `OrderId` is expected.

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

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
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

typed_id!(UserId, "Unique identifier for the operator performing an action.");
typed_id!(BusinessUnitId, "Unique identifier for a business unit (tenant).");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(SupplierId, "Unique identifier for a supplier.");
typed_id!(ProductId, "Unique identifier for a product.");
typed_id!(LocationId, "Unique identifier for a stock location.");
typed_id!(VehicleId, "Unique identifier for a delivery vehicle.");
typed_id!(PersonId, "Unique identifier for a responsible person or helper.");
typed_id!(OrderId, "Unique identifier for a customer order.");
typed_id!(OrderLineId, "Unique identifier for an order line.");
typed_id!(LoadId, "Unique identifier for a load sheet.");
typed_id!(ChequeId, "Unique identifier for a cheque.");
typed_id!(PaymentId, "Unique identifier for a customer payment.");
typed_id!(AccountId, "Unique identifier for a bank or cash account.");
typed_id!(TransferId, "Unique identifier for an account transfer.");
typed_id!(PurchaseId, "Unique identifier for a purchase.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = OrderId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_typed_id_display() {
        let uuid = Uuid::new_v4();
        let id = ChequeId::from_uuid(uuid);
        assert_eq!(format!("{id}"), uuid.to_string());
    }

    #[test]
    fn test_typed_id_from_str() {
        let uuid = Uuid::new_v4();
        let id = AccountId::from_str(&uuid.to_string()).unwrap();
        assert_eq!(id.into_inner(), uuid);
        assert!(AccountId::from_str("invalid").is_err());
    }

    #[test]
    fn test_typed_ids_order_by_uuid() {
        let low = AccountId::from_uuid(Uuid::from_u128(1));
        let high = AccountId::from_uuid(Uuid::from_u128(2));
        assert!(low < high);
    }
}
