//! Cheque lifecycle service.

use chrono::{NaiveDate, Utc};
use haulbook_shared::types::{AccountId, UserId};
use rust_decimal::Decimal;

use crate::account::EntryKind;
use crate::cheque::error::ChequeError;
use crate::cheque::types::{
    ChequeAction, ChequeState, ChequeStatus, NewCheque, ReturnCause, SettlementEffect,
};
use crate::order::PaymentStatus;

/// Stateless service for cheque transitions.
///
/// Transitions are strictly forward. Re-applying the transition that led to
/// the current status is rejected, never silently accepted.
pub struct ChequeService;

impl ChequeService {
    /// Validate a cheque before it is registered as pending.
    pub fn validate_registration(cheque: &NewCheque) -> Result<(), ChequeError> {
        if cheque.cheque_number.trim().is_empty() {
            return Err(ChequeError::Validation(
                "Cheque number is required".to_string(),
            ));
        }
        if cheque.amount <= Decimal::ZERO {
            return Err(ChequeError::Validation(
                "Cheque amount must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Bank a pending cheque. No money moves until it clears.
    ///
    /// # Returns
    /// * `Ok(ChequeAction)` Pending → Deposited
    /// * `Err(ChequeError::InvalidTransition)` from any other status
    pub fn deposit(
        cheque: &ChequeState,
        account_id: AccountId,
        date: NaiveDate,
        actor: UserId,
    ) -> Result<ChequeAction, ChequeError> {
        Self::ensure(cheque, ChequeStatus::Pending, ChequeStatus::Deposited)?;
        let mut action = Self::action(cheque, ChequeStatus::Deposited, date, actor, None);
        action.deposit_account_id = Some(account_id);
        Ok(action)
    }

    /// Clear a deposited cheque, crediting its amount to the deposit account.
    ///
    /// # Returns
    /// * `Ok(ChequeAction)` Deposited → Passed
    /// * `Err(ChequeError::InvalidTransition)` from any other status
    pub fn clear(
        cheque: &ChequeState,
        date: NaiveDate,
        actor: UserId,
    ) -> Result<ChequeAction, ChequeError> {
        Self::ensure(cheque, ChequeStatus::Deposited, ChequeStatus::Passed)?;
        let account_id = Self::deposit_account(cheque)?;

        let mut action = Self::action(cheque, ChequeStatus::Passed, date, actor, None);
        action.effects.push(SettlementEffect::AccountDelta {
            account_id,
            amount: cheque.amount,
            kind: EntryKind::ChequeClear,
        });
        Ok(action)
    }

    /// Return a cheque.
    ///
    /// A pending cheque is handed back unbanked: the status stays pending and
    /// only a history record is written. A deposited cheque becomes
    /// returned and whatever it has posted is reversed. A bounced cheque also
    /// raises the customer's outstanding balance and marks the linked order
    /// unpaid.
    ///
    /// # Returns
    /// * `Err(ChequeError::InvalidTransition)` if the cheque passed or was
    ///   already returned
    pub fn return_cheque(
        cheque: &ChequeState,
        date: NaiveDate,
        reason: Option<String>,
        cause: ReturnCause,
        actor: UserId,
    ) -> Result<ChequeAction, ChequeError> {
        let reason = reason.filter(|r| !r.trim().is_empty());

        if cheque.status == ChequeStatus::Pending {
            let note = match reason {
                Some(r) => format!("handed back unbanked: {r}"),
                None => "handed back unbanked".to_string(),
            };
            return Ok(Self::action(
                cheque,
                ChequeStatus::Pending,
                date,
                actor,
                Some(note),
            ));
        }

        Self::ensure(cheque, ChequeStatus::Deposited, ChequeStatus::Returned)?;

        let mut action = Self::action(cheque, ChequeStatus::Returned, date, actor, reason);
        if !cheque.ledger_effect.is_zero() {
            action.effects.push(SettlementEffect::AccountDelta {
                account_id: Self::deposit_account(cheque)?,
                amount: -cheque.ledger_effect,
                kind: EntryKind::ChequeReversal,
            });
        }
        if cause == ReturnCause::Bounced {
            action.effects.push(SettlementEffect::CustomerOutstanding {
                customer_id: cheque.customer_id,
                delta: cheque.amount,
            });
            if let Some(order_id) = cheque.order_id {
                action.effects.push(SettlementEffect::OrderPayment {
                    order_id,
                    status: PaymentStatus::Unpaid,
                });
            }
        }
        Ok(action)
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Deposited
    /// - Deposited → Passed
    /// - Deposited → Returned
    #[must_use]
    pub fn is_valid_transition(from: ChequeStatus, to: ChequeStatus) -> bool {
        matches!(
            (from, to),
            (ChequeStatus::Pending, ChequeStatus::Deposited)
                | (ChequeStatus::Deposited, ChequeStatus::Passed | ChequeStatus::Returned)
        )
    }

    fn ensure(
        cheque: &ChequeState,
        expected: ChequeStatus,
        to: ChequeStatus,
    ) -> Result<(), ChequeError> {
        if cheque.status != expected {
            return Err(ChequeError::InvalidTransition {
                cheque_id: cheque.id,
                from: cheque.status,
                to,
            });
        }
        Ok(())
    }

    fn deposit_account(cheque: &ChequeState) -> Result<AccountId, ChequeError> {
        cheque.deposit_account_id.ok_or_else(|| {
            ChequeError::Validation(format!("Cheque {} has no deposit account", cheque.id))
        })
    }

    fn action(
        cheque: &ChequeState,
        to: ChequeStatus,
        date: NaiveDate,
        actor: UserId,
        reason: Option<String>,
    ) -> ChequeAction {
        ChequeAction {
            cheque_id: cheque.id,
            from: cheque.status,
            to,
            date,
            deposit_account_id: None,
            effects: Vec::new(),
            actor,
            reason,
            occurred_at: Utc::now(),
        }
    }
}
