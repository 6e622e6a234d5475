//! Order domain types.
//!
//! A single closed enum per concept replaces the status strings that used to
//! be compared ad hoc across the application.

use chrono::{DateTime, Utc};
use haulbook_shared::types::{BusinessUnitId, LoadId, OrderId, ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::history::{EntityKind, TransitionRecord};

/// Order lifecycle status.
///
/// The valid transitions are:
/// - Pending → Processing (approve)
/// - Processing → Checking (send to QC)
/// - Checking → Loading (pass QC)
/// - Loading/Checking → InTransit (assign to load)
/// - InTransit → Delivered/Partial/Returned (reconcile)
/// - InTransit → Loading (reschedule during reconciliation)
/// - Pending/Processing/Checking/Loading/InTransit → Cancelled (reject)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting approval.
    Pending,
    /// Approved, being picked.
    Processing,
    /// Under quality check.
    Checking,
    /// Passed QC, waiting for a load.
    Loading,
    /// On a vehicle.
    InTransit,
    /// Fully delivered.
    Delivered,
    /// Partially delivered.
    Partial,
    /// Brought back undelivered.
    Returned,
    /// Rejected.
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 9] = [
        Self::Pending,
        Self::Processing,
        Self::Checking,
        Self::Loading,
        Self::InTransit,
        Self::Delivered,
        Self::Partial,
        Self::Returned,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Checking => "checking",
            Self::Loading => "loading",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Partial => "partial",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string, ignoring case and separators.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "checking" => Some(Self::Checking),
            "loading" => Some(Self::Loading),
            "intransit" => Some(Self::InTransit),
            "delivered" => Some(Self::Delivered),
            "partial" => Some(Self::Partial),
            "returned" => Some(Self::Returned),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true for the delivery outcomes recorded by reconciliation.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Delivered | Self::Partial | Self::Returned)
    }

    /// Returns true if the order can never be loaded or cancelled again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_final() || matches!(self, Self::Cancelled)
    }

    /// Returns true if the order may still be rejected.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Processing | Self::Checking | Self::Loading | Self::InTransit
        )
    }

    /// Returns true if the order can be attached to a load.
    #[must_use]
    pub fn is_loadable(&self) -> bool {
        matches!(self, Self::Loading | Self::Checking)
    }

    /// Returns true if reconciliation may assert this status.
    #[must_use]
    pub fn is_reconciliation_target(&self) -> bool {
        self.is_final() || matches!(self, Self::Loading)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status of an order's invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing collected.
    #[default]
    Unpaid,
    /// Partially collected.
    Partial,
    /// Fully collected.
    Paid,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" | "pending" => Some(Self::Unpaid),
            "partial" => Some(Self::Partial),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The state of an order that the state machine needs to decide a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    /// Order identifier.
    pub id: OrderId,
    /// Business unit the order belongs to.
    pub business_unit_id: BusinessUnitId,
    /// Current status.
    pub status: OrderStatus,
    /// Current invoice total.
    pub total_amount: Decimal,
    /// Amount frozen when the order was first dispatched.
    pub dispatched_amount: Option<Decimal>,
    /// The open load the order is attached to, if any.
    pub open_load: Option<LoadId>,
}

/// A line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineInput {
    /// Product ordered.
    pub product_id: ProductId,
    /// Billed quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Quantity given free of charge, claimable from the supplier.
    #[serde(default)]
    pub free_quantity: Decimal,
}

/// A validated order status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTransition {
    /// Order identifier.
    pub order_id: OrderId,
    /// Status before the change.
    pub from: OrderStatus,
    /// Status after the change.
    pub to: OrderStatus,
    /// Operator who made the change.
    pub actor: UserId,
    /// When the change was decided.
    pub occurred_at: DateTime<Utc>,
    /// Optional reason.
    pub reason: Option<String>,
}

impl OrderTransition {
    /// Creates a transition stamped with the current time.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        actor: UserId,
        reason: Option<String>,
    ) -> Self {
        Self {
            order_id,
            from,
            to,
            actor,
            occurred_at: Utc::now(),
            reason,
        }
    }

    /// Builds the history record for this transition.
    #[must_use]
    pub fn history(&self) -> TransitionRecord {
        TransitionRecord {
            entity_kind: EntityKind::Order,
            entity_id: Uuid::from(self.order_id),
            previous_state: self.from.as_str().to_string(),
            new_state: self.to.as_str().to_string(),
            actor: self.actor,
            reason: self.reason.clone(),
            occurred_at: self.occurred_at,
        }
    }
}

/// Result of attaching an order to a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAssignment {
    /// The status change (to in transit).
    pub transition: OrderTransition,
    /// The load the order was attached to.
    pub load_id: LoadId,
    /// Dispatched amount after the assignment.
    pub dispatched_amount: Decimal,
    /// True if this assignment took the first (and only) snapshot.
    pub snapshot_taken: bool,
}
