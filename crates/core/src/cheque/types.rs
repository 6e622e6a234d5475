//! Cheque domain types.

use chrono::{DateTime, NaiveDate, Utc};
use haulbook_shared::types::{AccountId, ChequeId, CustomerId, OrderId, PaymentId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::account::EntryKind;
use crate::history::{EntityKind, TransitionRecord};
use crate::order::PaymentStatus;

/// Cheque lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChequeStatus {
    /// In hand, not banked.
    Pending,
    /// Banked, awaiting clearance.
    Deposited,
    /// Cleared.
    Passed,
    /// Bounced or taken back.
    Returned,
}

impl ChequeStatus {
    /// All statuses.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Deposited, Self::Passed, Self::Returned];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Deposited => "deposited",
            Self::Passed => "passed",
            Self::Returned => "returned",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "deposited" => Some(Self::Deposited),
            "passed" | "cleared" => Some(Self::Passed),
            "returned" | "bounced" => Some(Self::Returned),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Returned)
    }
}

impl fmt::Display for ChequeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cheque to register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCheque {
    /// Payment the cheque settles.
    pub payment_id: PaymentId,
    /// Number printed on the cheque.
    pub cheque_number: String,
    /// Face value.
    pub amount: Decimal,
    /// Date written on the cheque.
    pub cheque_date: NaiveDate,
    /// Drawer.
    pub customer_id: CustomerId,
    /// Invoice the payment is for.
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

/// The state of a cheque needed to decide a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChequeState {
    /// Cheque identifier.
    pub id: ChequeId,
    /// Face value.
    pub amount: Decimal,
    /// Current status.
    pub status: ChequeStatus,
    /// Account the cheque was banked into.
    pub deposit_account_id: Option<AccountId>,
    /// Drawer.
    pub customer_id: CustomerId,
    /// Linked invoice.
    pub order_id: Option<OrderId>,
    /// Net amount this cheque has posted to accounts so far.
    pub ledger_effect: Decimal,
}

/// Why a cheque comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCause {
    /// The bank refused it; the customer owes the amount again.
    #[default]
    Bounced,
    /// The goods it paid for came back undelivered.
    OrderReturned,
}

/// A side effect of a cheque transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementEffect {
    /// Post a signed amount to an account.
    AccountDelta {
        /// Account to post to.
        account_id: AccountId,
        /// Signed amount.
        amount: Decimal,
        /// Posting kind.
        kind: EntryKind,
    },
    /// Change a customer's outstanding balance.
    CustomerOutstanding {
        /// The customer.
        customer_id: CustomerId,
        /// Signed change.
        delta: Decimal,
    },
    /// Set the payment status of the linked order.
    OrderPayment {
        /// The order.
        order_id: OrderId,
        /// New payment status.
        status: PaymentStatus,
    },
}

/// A validated cheque transition and its effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChequeAction {
    /// Cheque identifier.
    pub cheque_id: ChequeId,
    /// Status before.
    pub from: ChequeStatus,
    /// Status after; equal to `from` when a pending cheque is handed back.
    pub to: ChequeStatus,
    /// Business date of the transition.
    pub date: NaiveDate,
    /// Deposit account to record, on deposit.
    pub deposit_account_id: Option<AccountId>,
    /// Effects to apply in the same transaction.
    pub effects: Vec<SettlementEffect>,
    /// Operator.
    pub actor: UserId,
    /// Free-text reason.
    pub reason: Option<String>,
    /// When the transition happened.
    pub occurred_at: DateTime<Utc>,
}

impl ChequeAction {
    /// Builds the history record for this action.
    #[must_use]
    pub fn history(&self) -> TransitionRecord {
        TransitionRecord {
            entity_kind: EntityKind::Cheque,
            entity_id: Uuid::from(self.cheque_id),
            previous_state: self.from.as_str().to_string(),
            new_state: self.to.as_str().to_string(),
            actor: self.actor,
            reason: self.reason.clone(),
            occurred_at: self.occurred_at,
        }
    }

    /// Returns true if the status changes.
    #[must_use]
    pub fn changes_status(&self) -> bool {
        self.from != self.to
    }
}
