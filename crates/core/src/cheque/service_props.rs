//! Property-based tests for ChequeService.

use chrono::NaiveDate;
use haulbook_shared::types::{AccountId, ChequeId, CustomerId, OrderId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::cheque::service::ChequeService;
use crate::cheque::types::{ChequeState, ChequeStatus, ReturnCause, SettlementEffect};

fn arb_status() -> impl Strategy<Value = ChequeStatus> {
    proptest::sample::select(ChequeStatus::ALL.to_vec())
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_cause() -> impl Strategy<Value = ReturnCause> {
    prop_oneof![Just(ReturnCause::Bounced), Just(ReturnCause::OrderReturned)]
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Deposit,
    Clear,
    Return(ReturnCause),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Deposit),
        Just(Op::Clear),
        arb_cause().prop_map(Op::Return),
    ]
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap_or_default()
}

fn state(status: ChequeStatus, amount: Decimal) -> ChequeState {
    ChequeState {
        id: ChequeId::new(),
        amount,
        status,
        deposit_account_id: Some(AccountId::new()),
        customer_id: CustomerId::new(),
        order_id: Some(OrderId::new()),
        ledger_effect: Decimal::ZERO,
    }
}

fn account_total(effects: &[SettlementEffect]) -> Decimal {
    effects
        .iter()
        .map(|e| match e {
            SettlementEffect::AccountDelta { amount, .. } => *amount,
            _ => Decimal::ZERO,
        })
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every operation from every status either follows the transition table
    /// or fails; a pending return is the only status-preserving success.
    #[test]
    fn prop_transition_table_is_exhaustive(status in arb_status(), op in arb_op(), amount in arb_amount()) {
        let cheque = state(status, amount);
        let actor = UserId::new();
        let result = match op {
            Op::Deposit => ChequeService::deposit(&cheque, AccountId::new(), date(), actor),
            Op::Clear => ChequeService::clear(&cheque, date(), actor),
            Op::Return(cause) => ChequeService::return_cheque(&cheque, date(), None, cause, actor),
        };

        match result {
            Ok(action) if action.changes_status() => {
                prop_assert!(ChequeService::is_valid_transition(action.from, action.to));
            }
            Ok(action) => {
                prop_assert!(matches!(op, Op::Return(_)));
                prop_assert_eq!(action.from, ChequeStatus::Pending);
                prop_assert!(action.effects.is_empty());
            }
            Err(_) => {
                let expected = match op {
                    Op::Deposit => ChequeStatus::Pending,
                    Op::Clear | Op::Return(_) => ChequeStatus::Deposited,
                };
                prop_assert_ne!(status, expected);
                if matches!(op, Op::Return(_)) {
                    prop_assert_ne!(status, ChequeStatus::Pending);
                }
            }
        }
    }

    /// Following any sequence of operations, the postings of a cheque never
    /// exceed its amount and a returned cheque has posted nothing net.
    #[test]
    fn prop_ledger_effect_is_bounded(amount in arb_amount(), ops in prop::collection::vec(arb_op(), 1..12)) {
        let mut cheque = state(ChequeStatus::Pending, amount);
        cheque.deposit_account_id = None;
        let actor = UserId::new();

        for op in ops {
            let result = match op {
                Op::Deposit => ChequeService::deposit(&cheque, AccountId::new(), date(), actor),
                Op::Clear => ChequeService::clear(&cheque, date(), actor),
                Op::Return(cause) => ChequeService::return_cheque(&cheque, date(), None, cause, actor),
            };
            if let Ok(action) = result {
                cheque.ledger_effect += account_total(&action.effects);
                cheque.status = action.to;
                if let Some(account) = action.deposit_account_id {
                    cheque.deposit_account_id = Some(account);
                }
            }
            prop_assert!(cheque.ledger_effect >= Decimal::ZERO);
            prop_assert!(cheque.ledger_effect <= amount);
            if cheque.status == ChequeStatus::Returned {
                prop_assert!(cheque.ledger_effect.is_zero());
            }
            if cheque.status == ChequeStatus::Passed {
                prop_assert_eq!(cheque.ledger_effect, amount);
            }
        }
    }
}
