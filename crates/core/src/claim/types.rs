//! Claim domain types.

use haulbook_shared::types::{BusinessUnitId, OrderId, OrderLineId, ProductId, PurchaseId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claim status of an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Nothing to claim.
    #[default]
    #[serde(rename = "none")]
    NoClaim,
    /// Free quantity waiting to be claimed.
    Unclaimed,
    /// Converted into a purchase.
    Approved,
}

impl ClaimStatus {
    /// Initial status of a line with the given free quantity.
    #[must_use]
    pub fn for_free_quantity(free_quantity: Decimal) -> Self {
        if free_quantity > Decimal::ZERO {
            Self::Unclaimed
        } else {
            Self::NoClaim
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoClaim => "none",
            Self::Unclaimed => "unclaimed",
            Self::Approved => "approved",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::NoClaim),
            "unclaimed" | "pending" => Some(Self::Unclaimed),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An order line that may carry a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimItem {
    /// Order line identifier.
    pub line_id: OrderLineId,
    /// Order the line belongs to.
    pub order_id: OrderId,
    /// Business unit of the order.
    pub business_unit_id: BusinessUnitId,
    /// Product given free.
    pub product_id: ProductId,
    /// Free quantity.
    pub free_quantity: Decimal,
    /// Claim status.
    pub claim_status: ClaimStatus,
    /// True if the owning order was cancelled.
    #[serde(default)]
    pub order_cancelled: bool,
}

/// A validated conversion of claims into one purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimConversion {
    /// Purchase to create.
    pub purchase_id: PurchaseId,
    /// Quantity per product, ordered by product.
    pub lines: Vec<(ProductId, Decimal)>,
    /// Lines to mark approved.
    pub line_ids: Vec<OrderLineId>,
}

impl ClaimConversion {
    /// Total quantity restocked.
    #[must_use]
    pub fn total_quantity(&self) -> Decimal {
        self.lines.iter().map(|(_, q)| *q).sum()
    }
}
