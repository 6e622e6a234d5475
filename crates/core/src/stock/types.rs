//! Stock ledger domain types.

use haulbook_shared::types::{LocationId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a stock position.
pub type StockKey = (LocationId, ProductId);

/// Quantities of one product at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPosition {
    /// Location.
    pub location_id: LocationId,
    /// Product.
    pub product_id: ProductId,
    /// Sellable quantity.
    pub good_quantity: Decimal,
    /// Damaged quantity.
    pub damaged_quantity: Decimal,
}

impl StockPosition {
    /// An empty position.
    #[must_use]
    pub fn empty(location_id: LocationId, product_id: ProductId) -> Self {
        Self {
            location_id,
            product_id,
            good_quantity: Decimal::ZERO,
            damaged_quantity: Decimal::ZERO,
        }
    }

    /// Returns the position key.
    #[must_use]
    pub fn key(&self) -> StockKey {
        (self.location_id, self.product_id)
    }
}

/// Cause of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods received from a supplier.
    PurchaseReceipt,
    /// Stock count correction.
    Adjustment,
    /// Good stock written down as damaged.
    Damage,
    /// Received from another location.
    TransferIn,
    /// Sent to another location.
    TransferOut,
    /// Free-issue claim restocked.
    ClaimConversion,
}

impl MovementKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PurchaseReceipt => "purchase_receipt",
            Self::Adjustment => "adjustment",
            Self::Damage => "damage",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::ClaimConversion => "claim_conversion",
        }
    }

    /// Parses a kind from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase_receipt" => Some(Self::PurchaseReceipt),
            "adjustment" => Some(Self::Adjustment),
            "damage" => Some(Self::Damage),
            "transfer_in" => Some(Self::TransferIn),
            "transfer_out" => Some(Self::TransferOut),
            "claim_conversion" => Some(Self::ClaimConversion),
            _ => None,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line of a damage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageLine {
    /// Product damaged.
    pub product_id: ProductId,
    /// Quantity damaged.
    pub quantity: Decimal,
    /// Kind of damage, e.g. "broken" or "water".
    pub damage_type: String,
}

/// A line of a stock count adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    /// Product counted.
    pub product_id: ProductId,
    /// Counted good quantity.
    pub new_quantity: Decimal,
}

/// A line of a transfer between locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLine {
    /// Product moved.
    pub product_id: ProductId,
    /// Quantity moved.
    pub quantity: Decimal,
}

/// One recorded change of one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    /// Location.
    pub location_id: LocationId,
    /// Product.
    pub product_id: ProductId,
    /// Cause.
    pub kind: MovementKind,
    /// Change of good quantity.
    pub good_delta: Decimal,
    /// Change of damaged quantity.
    pub damaged_delta: Decimal,
    /// Good quantity after the change.
    pub good_after: Decimal,
    /// Damaged quantity after the change.
    pub damaged_after: Decimal,
    /// Free-text note, e.g. a damage type or adjustment reason.
    pub note: Option<String>,
}

/// Positions to write and movements to append for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPlan {
    /// New values of every touched position.
    pub positions: Vec<StockPosition>,
    /// Movements, one per touched position and cause.
    pub movements: Vec<StockMovement>,
}
