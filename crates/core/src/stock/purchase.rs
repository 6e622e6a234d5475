//! Purchase receipts.

use haulbook_shared::types::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stock::error::StockError;

/// Purchase lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    /// Being prepared.
    Draft,
    /// Sent to the supplier.
    Ordered,
    /// Goods received into stock.
    Received,
    /// Abandoned.
    Cancelled,
}

impl PurchaseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ordered => "ordered",
            Self::Received => "received",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "ordered" => Some(Self::Ordered),
            "received" => Some(Self::Received),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line of a purchase receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLineInput {
    /// Product received.
    pub product_id: ProductId,
    /// Quantity received.
    pub quantity: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
}

/// Validate purchase lines and return the total cost.
///
/// # Errors
/// * `StockError::Validation` naming the first line with a non-positive
///   quantity or a negative cost
pub fn purchase_total(lines: &[PurchaseLineInput]) -> Result<Decimal, StockError> {
    if lines.is_empty() {
        return Err(StockError::Validation(
            "Purchase must have at least one line".to_string(),
        ));
    }
    let mut total = Decimal::ZERO;
    for (index, line) in lines.iter().enumerate() {
        if line.quantity <= Decimal::ZERO {
            return Err(StockError::Validation(format!(
                "Line {index}: quantity must be positive"
            )));
        }
        if line.unit_cost < Decimal::ZERO {
            return Err(StockError::Validation(format!(
                "Line {index}: unit cost must not be negative"
            )));
        }
        total += line.quantity * line.unit_cost;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_cost: Decimal) -> PurchaseLineInput {
        PurchaseLineInput {
            product_id: ProductId::new(),
            quantity,
            unit_cost,
        }
    }

    #[test]
    fn test_purchase_total() {
        let total = purchase_total(&[line(dec!(10), dec!(2.5)), line(dec!(4), dec!(0))]).unwrap();
        assert_eq!(total, dec!(25));
    }

    #[test]
    fn test_purchase_total_rejects_bad_lines() {
        assert!(purchase_total(&[]).is_err());
        assert!(purchase_total(&[line(dec!(0), dec!(1))]).is_err());
        let err = purchase_total(&[line(dec!(1), dec!(1)), line(dec!(1), dec!(-1))]).unwrap_err();
        assert!(err.to_string().contains("Line 1"));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            PurchaseStatus::Draft,
            PurchaseStatus::Ordered,
            PurchaseStatus::Received,
            PurchaseStatus::Cancelled,
        ] {
            assert_eq!(PurchaseStatus::parse(status.as_str()), Some(status));
        }
    }
}
