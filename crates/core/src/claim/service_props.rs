//! Property-based tests for ClaimService.

use haulbook_shared::types::{BusinessUnitId, OrderId, OrderLineId, ProductId, PurchaseId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::claim::service::ClaimService;
use crate::claim::types::{ClaimItem, ClaimStatus};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Grouping preserves the total free quantity and yields one line per
    /// distinct product.
    #[test]
    fn prop_grouping_preserves_quantities(
        picks in prop::collection::vec((0usize..4, 1i64..1_000i64), 1..20),
    ) {
        let products: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
        let items: Vec<ClaimItem> = picks
            .iter()
            .map(|(p, q)| ClaimItem {
                line_id: OrderLineId::new(),
                order_id: OrderId::new(),
                business_unit_id: BusinessUnitId::new(),
                product_id: products[*p],
                free_quantity: Decimal::from(*q),
                claim_status: ClaimStatus::Unclaimed,
                order_cancelled: false,
            })
            .collect();
        let selection: Vec<_> = items.iter().map(|i| i.line_id).collect();

        let conversion = ClaimService::plan(&selection, &items, PurchaseId::new()).unwrap();

        let expected: Decimal = items.iter().map(|i| i.free_quantity).sum();
        prop_assert_eq!(conversion.total_quantity(), expected);

        let mut distinct: Vec<_> = picks.iter().map(|(p, _)| *p).collect();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(conversion.lines.len(), distinct.len());
    }
}
