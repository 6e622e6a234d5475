//! Reconciliation domain types.

use haulbook_shared::types::{LoadId, OrderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::load::LoadTransition;
use crate::order::{OrderSnapshot, OrderStatus, OrderTransition, PaymentStatus};

/// The operator's asserted outcome for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// Order being reconciled.
    pub order_id: OrderId,
    /// Asserted status: delivered, partial, returned, or loading to reschedule.
    pub status: OrderStatus,
    /// Asserted payment status.
    pub payment_status: PaymentStatus,
    /// Operator notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Final invoice amount.
    pub final_amount: Decimal,
}

/// An order referenced by a reconciliation batch, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedOrder {
    /// Status and amounts.
    pub snapshot: OrderSnapshot,
    /// Current payment status.
    pub payment_status: PaymentStatus,
    /// Current notes.
    pub notes: Option<String>,
    /// Whether the order is listed on the load's manifest.
    pub on_manifest: bool,
    /// Whether the order is still attached to the load being reconciled.
    pub attached: bool,
}

/// Why an update was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No such order.
    UnknownOrder,
    /// The order was never on this load.
    NotOnLoad,
    /// The order was rescheduled off this load.
    Rescheduled,
    /// The order's outcome is settled and cannot take the asserted status.
    AlreadyResolved,
}

impl SkipReason {
    /// Returns a human-readable description.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::UnknownOrder => "order does not exist",
            Self::NotOnLoad => "order is not on this load",
            Self::Rescheduled => "order was rescheduled off this load",
            Self::AlreadyResolved => "order is already resolved",
        }
    }
}

/// A change to persist for one reconciled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledOrder {
    /// Status change; `from == to` for an amount-only correction.
    pub transition: OrderTransition,
    /// New invoice total.
    pub total_amount: Decimal,
    /// New payment status.
    pub payment_status: PaymentStatus,
    /// New notes.
    pub notes: Option<String>,
    /// The dispatched snapshot the final amount is compared against.
    pub dispatched_amount: Decimal,
    /// `final_amount - dispatched_amount`.
    pub diff: Decimal,
    /// The order leaves the load (reschedule).
    pub detach: bool,
    /// The order has just become returned; its cheques are settled back.
    pub settle_cheques: bool,
}

/// What happened to one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The order changed.
    Applied(Box<ReconciledOrder>),
    /// The order already had the asserted values.
    Unchanged,
    /// The update was ignored.
    Skipped(SkipReason),
}

/// Outcome of one update, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOutcome {
    /// Order named by the update.
    pub order_id: OrderId,
    /// Outcome.
    pub kind: OutcomeKind,
}

/// Everything one reconciliation call will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Load being reconciled.
    pub load_id: LoadId,
    /// One outcome per update.
    pub outcomes: Vec<OrderOutcome>,
    /// Set when this call closes the load.
    pub close: Option<LoadTransition>,
}

impl ReconciliationPlan {
    /// Returns the applied changes.
    pub fn applied(&self) -> impl Iterator<Item = &ReconciledOrder> {
        self.outcomes.iter().filter_map(|o| match &o.kind {
            OutcomeKind::Applied(change) => Some(change.as_ref()),
            _ => None,
        })
    }

    /// Returns true if the call writes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.close.is_none() && self.applied().next().is_none()
    }
}
