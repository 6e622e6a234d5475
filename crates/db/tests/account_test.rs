//! Integration tests for the account ledger.
//!
//! Every balance change is an entry; these tests check that balances always
//! equal the sum of their entries and that failed moves write nothing.

mod common;

use haulbook_core::account::{AccountError, AccountType};
use haulbook_db::AccountRepository;
use haulbook_db::repositories::{OpenAccountInput, TransferInput};
use haulbook_shared::types::{AccountId, PageRequest, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{day, open_account, setup};

async fn entry_sum(repo: &AccountRepository, account_id: AccountId) -> Decimal {
    let page = PageRequest {
        page: 1,
        per_page: 100,
    };
    repo.list_entries(account_id, page)
        .await
        .expect("Failed to list entries")
        .data
        .iter()
        .map(|entry| entry.amount)
        .sum()
}

// ============================================================================
// Test: Transfer moves funds and posts both sides
// ============================================================================

#[tokio::test]
async fn test_transfer_between_accounts() {
    let db = setup().await;
    let actor = UserId::new();
    let repo = AccountRepository::new(db.clone());
    let from = open_account(&db, "Savings", dec!(1000), actor).await;
    let to = open_account(&db, "Current", dec!(50), actor).await;

    let result = repo
        .transfer(
            TransferInput {
                from_account_id: from,
                to_account_id: to,
                amount: dec!(400),
                date: day(19),
                note: Some("float".to_string()),
            },
            actor,
        )
        .await
        .expect("Failed to transfer");

    assert_eq!(result.from.balance, dec!(600));
    assert_eq!(result.to.balance, dec!(450));
    assert_eq!(entry_sum(&repo, from).await, dec!(600));
    assert_eq!(entry_sum(&repo, to).await, dec!(450));
}

// ============================================================================
// Test: Insufficient funds leave both balances untouched
// ============================================================================

#[tokio::test]
async fn test_transfer_insufficient_funds() {
    let db = setup().await;
    let actor = UserId::new();
    let repo = AccountRepository::new(db.clone());
    let from = open_account(&db, "Savings", dec!(100), actor).await;
    let to = open_account(&db, "Current", dec!(0), actor).await;

    let result = repo
        .transfer(
            TransferInput {
                from_account_id: from,
                to_account_id: to,
                amount: dec!(150),
                date: day(19),
                note: None,
            },
            actor,
        )
        .await;

    match result {
        Err(AccountError::InsufficientFunds {
            balance, requested, ..
        }) => {
            assert_eq!(balance, dec!(100));
            assert_eq!(requested, dec!(150));
        }
        other => panic!("Expected InsufficientFunds error, got {other:?}"),
    }

    let from_row = repo.find(from).await.expect("find");
    let to_row = repo.find(to).await.expect("find");
    assert_eq!(from_row.balance, dec!(100));
    assert_eq!(to_row.balance, Decimal::ZERO);
    assert_eq!(entry_sum(&repo, to).await, Decimal::ZERO);
}

// ============================================================================
// Test: Transfer to the same account is rejected
// ============================================================================

#[tokio::test]
async fn test_transfer_same_account() {
    let db = setup().await;
    let actor = UserId::new();
    let repo = AccountRepository::new(db.clone());
    let account = open_account(&db, "Cash", dec!(10), actor).await;

    let result = repo
        .transfer(
            TransferInput {
                from_account_id: account,
                to_account_id: account,
                amount: dec!(1),
                date: day(19),
                note: None,
            },
            actor,
        )
        .await;
    assert!(matches!(result, Err(AccountError::SameAccount(_))));
}

// ============================================================================
// Test: Cash movements respect the overdraft flag
// ============================================================================

#[tokio::test]
async fn test_cash_movements_and_overdraft() {
    let db = setup().await;
    let actor = UserId::new();
    let repo = AccountRepository::new(db.clone());

    let strict = open_account(&db, "Till", dec!(20), actor).await;
    repo.deposit_cash(strict, dec!(30), day(19), None, actor)
        .await
        .expect("Failed to deposit cash");
    let result = repo
        .withdraw_cash(strict, dec!(60), day(19), None, actor)
        .await;
    assert!(matches!(result, Err(AccountError::InsufficientFunds { .. })));
    assert_eq!(repo.find(strict).await.expect("find").balance, dec!(50));

    let overdraft = repo
        .open(
            OpenAccountInput {
                name: "Overdraft".to_string(),
                account_type: AccountType::Current,
                opening_balance: Decimal::ZERO,
                allow_overdraft: true,
                bank_code: Some("7010".to_string()),
            },
            actor,
        )
        .await
        .expect("Failed to open account");
    let overdraft_id = AccountId::from_uuid(overdraft.id);
    let drawn = repo
        .withdraw_cash(overdraft_id, dec!(75), day(19), Some("fuel".to_string()), actor)
        .await
        .expect("Overdraft withdrawal should succeed");
    assert_eq!(drawn.balance, dec!(-75));
    assert_eq!(entry_sum(&repo, overdraft_id).await, dec!(-75));
}

// ============================================================================
// Test: Non-positive amounts are rejected
// ============================================================================

#[tokio::test]
async fn test_non_positive_amounts() {
    let db = setup().await;
    let actor = UserId::new();
    let repo = AccountRepository::new(db.clone());
    let account = open_account(&db, "Cash", dec!(10), actor).await;

    assert!(matches!(
        repo.deposit_cash(account, Decimal::ZERO, day(19), None, actor).await,
        Err(AccountError::Validation(_))
    ));
    assert!(matches!(
        repo.withdraw_cash(account, dec!(-5), day(19), None, actor).await,
        Err(AccountError::Validation(_))
    ));
    assert!(matches!(
        repo.find(AccountId::new()).await,
        Err(AccountError::NotFound(_))
    ));
}
