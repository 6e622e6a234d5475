//! Append-only ledger of order amount changes.
//!
//! The dispatched amount is not tracked as a free-standing mutable value: it
//! is the first `Dispatched` entry of the order's amount ledger. The cached
//! column in storage is only ever filled from [`dispatched_amount`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::order::error::OrderError;
use crate::order::types::OrderLineInput;

/// Why an order amount was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountChangeKind {
    /// Total at order placement.
    Placed,
    /// Total changed by the invoice editor.
    InvoiceEdit,
    /// Snapshot taken when the order left on a load.
    Dispatched,
    /// Final amount asserted at reconciliation.
    Reconciled,
}

impl AmountChangeKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::InvoiceEdit => "invoice_edit",
            Self::Dispatched => "dispatched",
            Self::Reconciled => "reconciled",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "placed" => Some(Self::Placed),
            "invoice_edit" => Some(Self::InvoiceEdit),
            "dispatched" => Some(Self::Dispatched),
            "reconciled" => Some(Self::Reconciled),
            _ => None,
        }
    }
}

impl fmt::Display for AmountChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of an order's amount ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountChange {
    /// Why the amount was recorded.
    pub kind: AmountChangeKind,
    /// The amount.
    pub amount: Decimal,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl AmountChange {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn now(kind: AmountChangeKind, amount: Decimal) -> Self {
        Self {
            kind,
            amount,
            recorded_at: Utc::now(),
        }
    }
}

/// Returns the dispatched amount: the first `Dispatched` entry, if any.
#[must_use]
pub fn dispatched_amount(changes: &[AmountChange]) -> Option<Decimal> {
    changes
        .iter()
        .find(|c| c.kind == AmountChangeKind::Dispatched)
        .map(|c| c.amount)
}

/// Returns the latest recorded amount, if any.
#[must_use]
pub fn current_amount(changes: &[AmountChange]) -> Option<Decimal> {
    changes
        .iter()
        .rev()
        .find(|c| c.kind != AmountChangeKind::Dispatched)
        .map(|c| c.amount)
}

/// Computes the invoice total of a new order.
///
/// Free quantity is not billed. Every line must carry a billed or a free
/// quantity; negative quantities and prices are rejected.
pub fn order_total(lines: &[OrderLineInput]) -> Result<Decimal, OrderError> {
    if lines.is_empty() {
        return Err(OrderError::Validation(
            "Order must have at least one line".to_string(),
        ));
    }

    let mut total = Decimal::ZERO;
    for (index, line) in lines.iter().enumerate() {
        if line.quantity < Decimal::ZERO
            || line.free_quantity < Decimal::ZERO
            || line.unit_price < Decimal::ZERO
        {
            return Err(OrderError::Validation(format!(
                "Line {index}: quantities and prices must not be negative"
            )));
        }
        if line.quantity.is_zero() && line.free_quantity.is_zero() {
            return Err(OrderError::Validation(format!(
                "Line {index}: quantity or free quantity is required"
            )));
        }
        total += line.quantity * line.unit_price;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulbook_shared::types::ProductId;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal, free_quantity: Decimal) -> OrderLineInput {
        OrderLineInput {
            product_id: ProductId::new(),
            quantity,
            unit_price,
            free_quantity,
        }
    }

    #[test]
    fn test_dispatched_amount_is_first_snapshot() {
        let changes = vec![
            AmountChange::now(AmountChangeKind::Placed, dec!(100)),
            AmountChange::now(AmountChangeKind::Dispatched, dec!(100)),
            AmountChange::now(AmountChangeKind::InvoiceEdit, dec!(90)),
            AmountChange::now(AmountChangeKind::Dispatched, dec!(90)),
        ];
        assert_eq!(dispatched_amount(&changes), Some(dec!(100)));
        assert_eq!(current_amount(&changes), Some(dec!(90)));
    }

    #[test]
    fn test_dispatched_amount_absent_before_loading() {
        let changes = vec![AmountChange::now(AmountChangeKind::Placed, dec!(100))];
        assert_eq!(dispatched_amount(&changes), None);
    }

    #[test]
    fn test_order_total_ignores_free_quantity() {
        let total = order_total(&[
            line(dec!(10), dec!(250), dec!(2)),
            line(dec!(1), dec!(7500), dec!(0)),
        ])
        .unwrap();
        assert_eq!(total, dec!(10000));
    }

    #[test]
    fn test_order_total_allows_free_only_line() {
        let total = order_total(&[line(dec!(0), dec!(0), dec!(5))]).unwrap();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_order_total_rejects_bad_lines() {
        assert!(matches!(order_total(&[]), Err(OrderError::Validation(_))));
        assert!(matches!(
            order_total(&[line(dec!(0), dec!(10), dec!(0))]),
            Err(OrderError::Validation(_))
        ));
        assert!(matches!(
            order_total(&[line(dec!(-1), dec!(10), dec!(0))]),
            Err(OrderError::Validation(_))
        ));
    }
}
