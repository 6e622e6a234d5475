//! Enums persisted as lowercase strings, with conversions to the core types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Declares a string-backed active enum mirroring a core enum.
macro_rules! mirror_enum {
    ($(#[$meta:meta])* $name:ident => $core:path { $($variant:ident = $value:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
        #[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
        #[allow(missing_docs)]
        pub enum $name {
            $(
                #[sea_orm(string_value = $value)]
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl From<$core> for $name {
            fn from(value: $core) -> Self {
                type Core = $core;
                match value {
                    $(Core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$name> for $core {
            fn from(value: $name) -> Self {
                type Core = $core;
                match value {
                    $($name::$variant => Core::$variant,)+
                }
            }
        }
    };
}

mirror_enum! {
    /// Order lifecycle status.
    OrderStatus => haulbook_core::order::OrderStatus {
        Pending = "pending",
        Processing = "processing",
        Checking = "checking",
        Loading = "loading",
        InTransit = "in_transit",
        Delivered = "delivered",
        Partial = "partial",
        Returned = "returned",
        Cancelled = "cancelled",
    }
}

mirror_enum! {
    /// Payment status of an invoice or purchase.
    PaymentStatus => haulbook_core::order::PaymentStatus {
        Unpaid = "unpaid",
        Partial = "partial",
        Paid = "paid",
    }
}

mirror_enum! {
    /// Kind of order amount change.
    AmountChangeKind => haulbook_core::order::AmountChangeKind {
        Placed = "placed",
        InvoiceEdit = "invoice_edit",
        Dispatched = "dispatched",
        Reconciled = "reconciled",
    }
}

mirror_enum! {
    /// Cheque lifecycle status.
    ChequeStatus => haulbook_core::cheque::ChequeStatus {
        Pending = "pending",
        Deposited = "deposited",
        Passed = "passed",
        Returned = "returned",
    }
}

mirror_enum! {
    /// Kind of account.
    AccountType => haulbook_core::account::AccountType {
        CashOnHand = "cash_on_hand",
        Savings = "savings",
        Current = "current",
    }
}

mirror_enum! {
    /// Cause of an account entry.
    EntryKind => haulbook_core::account::EntryKind {
        Opening = "opening",
        Deposit = "deposit",
        Withdrawal = "withdrawal",
        TransferIn = "transfer_in",
        TransferOut = "transfer_out",
        ChequeClear = "cheque_clear",
        ChequeReversal = "cheque_reversal",
    }
}

mirror_enum! {
    /// Cause of a stock movement.
    MovementKind => haulbook_core::stock::MovementKind {
        PurchaseReceipt = "purchase_receipt",
        Adjustment = "adjustment",
        Damage = "damage",
        TransferIn = "transfer_in",
        TransferOut = "transfer_out",
        ClaimConversion = "claim_conversion",
    }
}

mirror_enum! {
    /// Purchase lifecycle status.
    PurchaseStatus => haulbook_core::stock::PurchaseStatus {
        Draft = "draft",
        Ordered = "ordered",
        Received = "received",
        Cancelled = "cancelled",
    }
}

mirror_enum! {
    /// Claim status of an order line.
    ClaimStatus => haulbook_core::claim::ClaimStatus {
        NoClaim = "none",
        Unclaimed = "unclaimed",
        Approved = "approved",
    }
}

mirror_enum! {
    /// Kind of entity a history record belongs to.
    EntityKind => haulbook_core::history::EntityKind {
        Order = "order",
        Cheque = "cheque",
        Load = "load",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulbook_core::order;
    use sea_orm::ActiveEnum;

    #[test]
    fn test_values_match_core_strings() {
        for status in order::OrderStatus::ALL {
            assert_eq!(OrderStatus::from(status).to_value(), status.as_str());
            assert_eq!(order::OrderStatus::from(OrderStatus::from(status)), status);
        }
    }

    #[test]
    fn test_entry_kind_values() {
        use haulbook_core::account;
        let kind = EntryKind::from(account::EntryKind::ChequeReversal);
        assert_eq!(kind.to_value(), "cheque_reversal");
    }
}
