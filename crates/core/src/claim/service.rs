//! Claim conversion service.

use std::collections::{BTreeMap, HashSet};

use haulbook_shared::types::{OrderLineId, PurchaseId};
use rust_decimal::Decimal;

use crate::claim::error::ClaimError;
use crate::claim::types::{ClaimConversion, ClaimItem, ClaimStatus};

/// Stateless service validating and grouping free-issue claims.
pub struct ClaimService;

impl ClaimService {
    /// Plan the conversion of the selected lines into one purchase.
    ///
    /// Quantities are grouped by product. The whole selection is rejected if
    /// any line fails.
    ///
    /// # Errors
    /// * `ClaimError::Validation` for an empty selection, a line selected
    ///   twice, a line without free quantity or a line of a cancelled order
    /// * `ClaimError::NotFound` for an unknown line
    /// * `ClaimError::AlreadyClaimed` for a line converted before
    pub fn plan(
        selection: &[OrderLineId],
        items: &[ClaimItem],
        purchase_id: PurchaseId,
    ) -> Result<ClaimConversion, ClaimError> {
        if selection.is_empty() {
            return Err(ClaimError::Validation(
                "Select at least one claim".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(selection.len());
        let mut grouped: BTreeMap<_, Decimal> = BTreeMap::new();
        for line_id in selection {
            if !seen.insert(*line_id) {
                return Err(ClaimError::Validation(format!(
                    "Order line {line_id} is selected more than once"
                )));
            }
            let item = items
                .iter()
                .find(|i| i.line_id == *line_id)
                .ok_or(ClaimError::NotFound(*line_id))?;

            match item.claim_status {
                ClaimStatus::Approved => return Err(ClaimError::AlreadyClaimed(*line_id)),
                ClaimStatus::NoClaim => {
                    return Err(ClaimError::Validation(format!(
                        "Order line {line_id} has no free quantity to claim"
                    )));
                }
                ClaimStatus::Unclaimed => {}
            }
            if item.order_cancelled {
                return Err(ClaimError::Validation(format!(
                    "Order line {line_id} belongs to cancelled order {}",
                    item.order_id
                )));
            }
            if item.free_quantity <= Decimal::ZERO {
                return Err(ClaimError::Validation(format!(
                    "Order line {line_id} has no free quantity to claim"
                )));
            }

            *grouped.entry(item.product_id).or_insert(Decimal::ZERO) += item.free_quantity;
        }

        Ok(ClaimConversion {
            purchase_id,
            lines: grouped.into_iter().collect(),
            line_ids: selection.to_vec(),
        })
    }

    /// Purchase number for a conversion, e.g. `FI-0192f4c3...`.
    #[must_use]
    pub fn purchase_number(prefix: &str, purchase_id: PurchaseId) -> String {
        format!("{prefix}-{}", uuid::Uuid::from(purchase_id).simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulbook_shared::types::{BusinessUnitId, OrderId, ProductId};
    use rust_decimal_macros::dec;

    fn item(product_id: ProductId, free: Decimal) -> ClaimItem {
        ClaimItem {
            line_id: OrderLineId::new(),
            order_id: OrderId::new(),
            business_unit_id: BusinessUnitId::new(),
            product_id,
            free_quantity: free,
            claim_status: ClaimStatus::for_free_quantity(free),
            order_cancelled: false,
        }
    }

    #[test]
    fn test_plan_groups_by_product() {
        let nails = ProductId::new();
        let screws = ProductId::new();
        let items = [item(nails, dec!(2)), item(screws, dec!(1)), item(nails, dec!(3))];
        let selection: Vec<_> = items.iter().map(|i| i.line_id).collect();

        let conversion = ClaimService::plan(&selection, &items, PurchaseId::new()).unwrap();
        assert_eq!(conversion.lines.len(), 2);
        assert!(conversion.lines.contains(&(nails, dec!(5))));
        assert!(conversion.lines.contains(&(screws, dec!(1))));
        assert_eq!(conversion.total_quantity(), dec!(6));
        assert_eq!(conversion.line_ids, selection);
    }

    #[test]
    fn test_plan_rejects_claimed_line() {
        let mut claimed = item(ProductId::new(), dec!(2));
        claimed.claim_status = ClaimStatus::Approved;
        let result = ClaimService::plan(&[claimed.line_id], &[claimed], PurchaseId::new());
        assert_eq!(result, Err(ClaimError::AlreadyClaimed(claimed.line_id)));
    }

    #[test]
    fn test_plan_rejects_bad_selections() {
        let plain = item(ProductId::new(), dec!(0));
        let free = item(ProductId::new(), dec!(1));
        let unknown = OrderLineId::new();

        assert!(matches!(
            ClaimService::plan(&[], &[], PurchaseId::new()),
            Err(ClaimError::Validation(_))
        ));
        assert!(matches!(
            ClaimService::plan(&[plain.line_id], &[plain], PurchaseId::new()),
            Err(ClaimError::Validation(_))
        ));
        assert!(matches!(
            ClaimService::plan(&[free.line_id, free.line_id], &[free], PurchaseId::new()),
            Err(ClaimError::Validation(_))
        ));
        assert_eq!(
            ClaimService::plan(&[free.line_id, unknown], &[free], PurchaseId::new()),
            Err(ClaimError::NotFound(unknown))
        );
    }

    #[test]
    fn test_plan_rejects_cancelled_order_line() {
        let mut orphaned = item(ProductId::new(), dec!(4));
        orphaned.order_cancelled = true;
        let result = ClaimService::plan(&[orphaned.line_id], &[orphaned], PurchaseId::new());
        assert!(matches!(result, Err(ClaimError::Validation(m)) if m.contains("cancelled")));
    }

    #[test]
    fn test_purchase_number() {
        let id = PurchaseId::new();
        let number = ClaimService::purchase_number("FI", id);
        assert!(number.starts_with("FI-"));
        assert_eq!(number.len(), 3 + 32);
    }
}
