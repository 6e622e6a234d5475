//! Account ledger service.

use haulbook_shared::types::{AccountId, ChequeId, TransferId};
use rust_decimal::Decimal;

use crate::account::error::AccountError;
use crate::account::types::{AccountState, EntryKind, LedgerPosting, TransferPlan};

/// Stateless service computing balance changes.
pub struct AccountService;

impl AccountService {
    /// Validate a new account and build its opening posting.
    ///
    /// A negative opening balance is only allowed on overdraft accounts.
    pub fn open(name: &str, account: &AccountState) -> Result<LedgerPosting, AccountError> {
        if name.trim().is_empty() {
            return Err(AccountError::Validation(
                "Account name is required".to_string(),
            ));
        }
        if account.balance < Decimal::ZERO && !account.allow_overdraft {
            return Err(AccountError::Validation(
                "Opening balance must not be negative".to_string(),
            ));
        }
        Ok(LedgerPosting {
            account_id: account.id,
            kind: EntryKind::Opening,
            amount: account.balance,
            balance_after: account.balance,
            transfer_id: None,
            cheque_id: None,
        })
    }

    /// Apply a signed change to an account.
    ///
    /// # Errors
    /// * `AccountError::InsufficientFunds` if the balance would go below zero
    ///   on an account without overdraft
    pub fn apply_delta(
        account: &AccountState,
        delta: Decimal,
        kind: EntryKind,
        cheque_id: Option<ChequeId>,
    ) -> Result<LedgerPosting, AccountError> {
        let balance_after = account.balance + delta;
        if delta < Decimal::ZERO && balance_after < Decimal::ZERO && !account.allow_overdraft {
            return Err(AccountError::InsufficientFunds {
                account_id: account.id,
                balance: account.balance,
                requested: -delta,
            });
        }
        Ok(LedgerPosting {
            account_id: account.id,
            kind,
            amount: delta,
            balance_after,
            transfer_id: None,
            cheque_id,
        })
    }

    /// Pay cash into an account.
    pub fn deposit(account: &AccountState, amount: Decimal) -> Result<LedgerPosting, AccountError> {
        Self::ensure_positive(amount)?;
        Self::apply_delta(account, amount, EntryKind::Deposit, None)
    }

    /// Take cash out of an account.
    pub fn withdraw(
        account: &AccountState,
        amount: Decimal,
    ) -> Result<LedgerPosting, AccountError> {
        Self::ensure_positive(amount)?;
        Self::apply_delta(account, -amount, EntryKind::Withdrawal, None)
    }

    /// Move funds between two accounts.
    ///
    /// # Errors
    /// * `AccountError::SameAccount` if both sides are the same account
    /// * `AccountError::Validation` if the amount is not positive
    /// * `AccountError::InsufficientFunds` if the source cannot cover it
    pub fn transfer(
        from: &AccountState,
        to: &AccountState,
        amount: Decimal,
        transfer_id: TransferId,
    ) -> Result<TransferPlan, AccountError> {
        if from.id == to.id {
            return Err(AccountError::SameAccount(from.id));
        }
        Self::ensure_positive(amount)?;

        let mut debit = Self::apply_delta(from, -amount, EntryKind::TransferOut, None)?;
        let mut credit = Self::apply_delta(to, amount, EntryKind::TransferIn, None)?;
        debit.transfer_id = Some(transfer_id);
        credit.transfer_id = Some(transfer_id);

        Ok(TransferPlan {
            transfer_id,
            debit,
            credit,
        })
    }

    /// Order in which two accounts must be locked.
    #[must_use]
    pub fn lock_order(a: AccountId, b: AccountId) -> [AccountId; 2] {
        if a <= b { [a, b] } else { [b, a] }
    }

    fn ensure_positive(amount: Decimal) -> Result<(), AccountError> {
        if amount <= Decimal::ZERO {
            return Err(AccountError::Validation(
                "Amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
