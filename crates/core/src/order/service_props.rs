//! Property-based tests for OrderService.

use haulbook_shared::types::{BusinessUnitId, LoadId, OrderId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::order::amounts::{AmountChange, AmountChangeKind, dispatched_amount};
use crate::order::error::OrderError;
use crate::order::service::OrderService;
use crate::order::types::{OrderSnapshot, OrderStatus};

fn arb_status() -> impl Strategy<Value = OrderStatus> {
    proptest::sample::select(OrderStatus::ALL.to_vec())
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Operations that can touch an order's amounts after QC.
#[derive(Debug, Clone)]
enum Step {
    Load,
    EditInvoice(Decimal),
    Reschedule,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Load),
        arb_amount().prop_map(Step::EditInvoice),
        Just(Step::Reschedule),
    ]
}

fn snapshot(status: OrderStatus, total: Decimal) -> OrderSnapshot {
    OrderSnapshot {
        id: OrderId::new(),
        business_unit_id: BusinessUnitId::new(),
        status,
        total_amount: total,
        dispatched_amount: None,
        open_load: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The dispatched amount is written once, at the first assignment, and
    /// always equals the first `Dispatched` entry of the amount ledger.
    #[test]
    fn prop_dispatched_amount_is_write_once(
        initial in arb_amount(),
        steps in prop::collection::vec(arb_step(), 1..30),
    ) {
        let actor = UserId::new();
        let mut order = snapshot(OrderStatus::Loading, initial);
        let mut ledger = vec![AmountChange::now(AmountChangeKind::Placed, initial)];
        let mut first_snapshot: Option<Decimal> = None;

        for step in steps {
            match step {
                Step::Load => {
                    let load_id = LoadId::new();
                    if let Ok(assignment) = OrderService::assign_to_load(&order, load_id, actor) {
                        if assignment.snapshot_taken {
                            prop_assert!(first_snapshot.is_none());
                            first_snapshot = Some(order.total_amount);
                            ledger.push(AmountChange::now(
                                AmountChangeKind::Dispatched,
                                assignment.dispatched_amount,
                            ));
                        }
                        order.status = assignment.transition.to;
                        order.dispatched_amount = Some(assignment.dispatched_amount);
                        order.open_load = Some(load_id);
                    }
                }
                Step::EditInvoice(amount) => {
                    if OrderService::edit_invoice_amount(&order, amount).is_ok() {
                        order.total_amount = amount;
                        ledger.push(AmountChange::now(AmountChangeKind::InvoiceEdit, amount));
                    }
                }
                Step::Reschedule => {
                    if order.status == OrderStatus::InTransit {
                        order.status = OrderStatus::Loading;
                        order.open_load = None;
                    }
                }
            }

            prop_assert_eq!(order.dispatched_amount, first_snapshot);
            prop_assert_eq!(dispatched_amount(&ledger), first_snapshot);
        }
    }

    /// Every transition the service produces is in the transition table.
    #[test]
    fn prop_service_transitions_are_valid(status in arb_status(), forced in any::<bool>()) {
        let actor = UserId::new();
        let order = snapshot(status, Decimal::ONE);
        let results = [
            OrderService::approve(&order, actor),
            OrderService::send_to_qc(&order, actor),
            OrderService::pass_qc(&order, actor, forced),
            OrderService::reject(&order, actor, None),
            OrderService::assign_to_load(&order, LoadId::new(), actor).map(|a| a.transition),
        ];
        for result in results {
            match result {
                Ok(transition) => {
                    prop_assert!(OrderService::is_valid_transition(transition.from, transition.to));
                    prop_assert_eq!(transition.from, status);
                }
                Err(err) => {
                    let is_invalid_transition = matches!(err, OrderError::InvalidTransition { .. });
                    prop_assert!(is_invalid_transition);
                }
            }
        }
    }

    /// Terminal orders accept no further QC, loading or cancellation.
    #[test]
    fn prop_terminal_orders_are_frozen(status in arb_status()) {
        prop_assume!(status.is_terminal());
        let actor = UserId::new();
        let order = snapshot(status, Decimal::ONE);
        prop_assert!(OrderService::pass_qc(&order, actor, true).is_err());
        prop_assert!(OrderService::reject(&order, actor, None).is_err());
        prop_assert!(OrderService::assign_to_load(&order, LoadId::new(), actor).is_err());
    }
}
