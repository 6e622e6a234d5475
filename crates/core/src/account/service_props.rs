//! Property-based tests for AccountService.

use haulbook_shared::types::{AccountId, TransferId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::account::error::AccountError;
use crate::account::service::AccountService;
use crate::account::types::AccountState;

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_balance() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A successful transfer moves money without creating or destroying it.
    #[test]
    fn prop_transfer_conserves_total(
        from_balance in arb_balance(),
        to_balance in arb_balance(),
        amount in arb_amount(),
        overdraft in any::<bool>(),
    ) {
        let from = AccountState { id: AccountId::new(), balance: from_balance, allow_overdraft: overdraft };
        let to = AccountState { id: AccountId::new(), balance: to_balance, allow_overdraft: false };

        match AccountService::transfer(&from, &to, amount, TransferId::new()) {
            Ok(plan) => {
                prop_assert_eq!(
                    plan.debit.balance_after + plan.credit.balance_after,
                    from_balance + to_balance
                );
                prop_assert_eq!(plan.debit.amount + plan.credit.amount, Decimal::ZERO);
                prop_assert!(overdraft || plan.debit.balance_after >= Decimal::ZERO);
            }
            Err(AccountError::InsufficientFunds { balance, requested, .. }) => {
                prop_assert!(!overdraft);
                prop_assert!(requested > balance);
                prop_assert_eq!(balance, from_balance);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// Replaying postings from the opening balance reconstructs the balance.
    #[test]
    fn prop_postings_reconstruct_balance(
        opening in arb_balance(),
        moves in prop::collection::vec((arb_amount(), any::<bool>()), 1..40),
    ) {
        let mut state = AccountState { id: AccountId::new(), balance: opening, allow_overdraft: false };
        let mut postings = vec![AccountService::open("Cash", &state).unwrap()];

        for (amount, is_deposit) in moves {
            let result = if is_deposit {
                AccountService::deposit(&state, amount)
            } else {
                AccountService::withdraw(&state, amount)
            };
            if let Ok(posting) = result {
                state.balance = posting.balance_after;
                postings.push(posting);
            }
            prop_assert!(state.balance >= Decimal::ZERO);
        }

        let total: Decimal = postings.iter().map(|p| p.amount).sum();
        prop_assert_eq!(total, state.balance);
    }
}
