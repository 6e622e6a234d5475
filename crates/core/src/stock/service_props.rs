//! Property-based tests for StockService.

use haulbook_shared::types::{LocationId, ProductId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::stock::error::StockError;
use crate::stock::service::StockService;
use crate::stock::types::{DamageLine, StockPosition};

fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(|n| Decimal::new(n, 1))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Damage moves quantity from good to damaged without changing the total,
    /// and fails without a plan when good stock cannot cover it.
    #[test]
    fn prop_damage_conserves_quantity(
        good in arb_quantity(),
        damaged in arb_quantity(),
        requested in prop::collection::vec(arb_quantity(), 1..5),
    ) {
        let location_id = LocationId::new();
        let product_id = ProductId::new();
        let position = StockPosition { location_id, product_id, good_quantity: good, damaged_quantity: damaged };
        let lines: Vec<DamageLine> = requested
            .iter()
            .map(|q| DamageLine { product_id, quantity: *q, damage_type: "broken".into() })
            .collect();
        let total: Decimal = requested.iter().copied().sum();

        match StockService::damage(location_id, &lines, &[position], Some("inspection")) {
            Ok(plan) => {
                prop_assert!(total <= good);
                let after = plan.positions[0];
                prop_assert_eq!(after.good_quantity + after.damaged_quantity, good + damaged);
                prop_assert_eq!(after.damaged_quantity - damaged, total);
            }
            Err(StockError::InsufficientStock { available, requested, .. }) => {
                prop_assert!(total > good);
                prop_assert_eq!(available, good);
                prop_assert_eq!(requested, total);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// A transfer never leaves a negative position and never changes the
    /// total across both locations.
    #[test]
    fn prop_transfer_never_goes_negative(good in arb_quantity(), quantity in arb_quantity()) {
        let from = LocationId::new();
        let to = LocationId::new();
        let product_id = ProductId::new();
        let position = StockPosition { location_id: from, product_id, good_quantity: good, damaged_quantity: Decimal::ZERO };
        let line = crate::stock::types::TransferLine { product_id, quantity };

        if let Ok(plan) = StockService::transfer(from, to, &[line], &[position]) {
            let total: Decimal = plan.positions.iter().map(|p| p.good_quantity).sum();
            prop_assert_eq!(total, good);
            prop_assert!(plan.positions.iter().all(|p| p.good_quantity >= Decimal::ZERO));
        } else {
            prop_assert!(quantity > good);
        }
    }
}
