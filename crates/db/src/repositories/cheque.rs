//! Cheque repository.
//!
//! A cheque action and all of its settlement effects (account postings,
//! customer outstanding, order payment status) commit together.

use chrono::{NaiveDate, Utc};
use haulbook_core::account::{AccountError, AccountService};
use haulbook_core::cheque::{
    ChequeAction, ChequeError, ChequeService, ChequeState, ChequeStatus, NewCheque, ReturnCause,
    SettlementEffect,
};
use haulbook_core::history::{EntityKind, TransitionRecord};
use haulbook_shared::types::{AccountId, ChequeId, CustomerId, OrderId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::entities::sea_orm_active_enums::ChequeStatus as DbChequeStatus;
use crate::entities::{accounts, cheques, customer_balances, orders};

use super::{account, history, order};

/// Cheque repository.
#[derive(Debug, Clone)]
pub struct ChequeRepository {
    db: DatabaseConnection,
}

impl ChequeRepository {
    /// Creates a new cheque repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a cheque received from a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The number is empty or the amount is not positive
    /// - The cheque number is already registered for the payment
    /// - Database operation fails
    #[instrument(skip(self, cheque), fields(cheque_number = %cheque.cheque_number))]
    pub async fn register(
        &self,
        cheque: NewCheque,
        actor: UserId,
    ) -> Result<cheques::Model, ChequeError> {
        ChequeService::validate_registration(&cheque)?;
        let cheque_number = cheque.cheque_number.trim().to_string();

        let existing = cheques::Entity::find()
            .filter(cheques::Column::PaymentId.eq(cheque.payment_id.into_inner()))
            .filter(cheques::Column::ChequeNumber.eq(cheque_number.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;
        if existing.is_some() {
            return Err(ChequeError::Duplicate(cheque_number));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;

        let now = Utc::now();
        let cheque_id = ChequeId::new();
        let created = cheques::ActiveModel {
            id: Set(cheque_id.into_inner()),
            payment_id: Set(cheque.payment_id.into_inner()),
            cheque_number: Set(cheque_number.clone()),
            amount: Set(cheque.amount),
            cheque_date: Set(cheque.cheque_date),
            status: Set(DbChequeStatus::Pending),
            deposit_account_id: Set(None),
            customer_id: Set(cheque.customer_id.into_inner()),
            order_id: Set(cheque.order_id.map(|id| id.into_inner())),
            deposited_on: Set(None),
            cleared_on: Set(None),
            returned_on: Set(None),
            return_reason: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ChequeError::Duplicate(cheque_number.clone())
            }
            _ => ChequeError::Database(e.to_string()),
        })?;

        let registered = TransitionRecord::now(
            EntityKind::Cheque,
            cheque_id.into_inner(),
            "new",
            ChequeStatus::Pending.as_str(),
            actor,
            None,
        );
        history::record(&txn, &registered)
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;

        info!(%cheque_id, amount = %created.amount, "cheque registered");
        Ok(created)
    }

    /// Gets a cheque by ID.
    ///
    /// # Errors
    ///
    /// Returns `ChequeError::NotFound` if the cheque does not exist.
    pub async fn find(&self, cheque_id: ChequeId) -> Result<cheques::Model, ChequeError> {
        cheques::Entity::find_by_id(cheque_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?
            .ok_or(ChequeError::NotFound(cheque_id))
    }

    /// Records that a pending cheque was banked into an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the cheque or account is missing or the cheque is
    /// not pending.
    #[instrument(skip(self))]
    pub async fn deposit(
        &self,
        cheque_id: ChequeId,
        account_id: AccountId,
        date: NaiveDate,
        actor: UserId,
    ) -> Result<cheques::Model, ChequeError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;

        let row = lock(&txn, cheque_id).await?;
        accounts::Entity::find_by_id(account_id.into_inner())
            .one(&txn)
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?
            .ok_or(AccountError::NotFound(account_id))?;

        let current = load_state(&txn, &row).await?;
        let action = ChequeService::deposit(&current, account_id, date, actor)?;
        let updated = apply_action(&txn, row, &action).await?;

        txn.commit()
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;
        Ok(updated)
    }

    /// Records that a deposited cheque cleared, crediting its account.
    ///
    /// # Errors
    ///
    /// Returns an error if the cheque is missing or not deposited.
    #[instrument(skip(self))]
    pub async fn clear(
        &self,
        cheque_id: ChequeId,
        date: NaiveDate,
        actor: UserId,
    ) -> Result<cheques::Model, ChequeError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;

        let row = lock(&txn, cheque_id).await?;
        let current = load_state(&txn, &row).await?;
        let action = ChequeService::clear(&current, date, actor)?;
        let updated = apply_action(&txn, row, &action).await?;

        txn.commit()
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;
        Ok(updated)
    }

    /// Records that a cheque bounced.
    ///
    /// A pending cheque is handed back without changing status.
    ///
    /// # Errors
    ///
    /// Returns an error if the cheque is missing, passed or already returned.
    #[instrument(skip(self, reason))]
    pub async fn return_cheque(
        &self,
        cheque_id: ChequeId,
        date: NaiveDate,
        reason: Option<String>,
        actor: UserId,
    ) -> Result<cheques::Model, ChequeError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;

        // Lock order: the linked order row, then the cheque row.
        let linked_order = cheques::Entity::find_by_id(cheque_id.into_inner())
            .one(&txn)
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?
            .ok_or(ChequeError::NotFound(cheque_id))?
            .order_id;
        if let Some(order_id) = linked_order {
            order::lock(&txn, OrderId::from_uuid(order_id))
                .await
                .map_err(|e| ChequeError::Database(e.to_string()))?;
        }

        let row = lock(&txn, cheque_id).await?;
        let current = load_state(&txn, &row).await?;
        let action =
            ChequeService::return_cheque(&current, date, reason, ReturnCause::Bounced, actor)?;
        let updated = apply_action(&txn, row, &action).await?;

        txn.commit()
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;
        Ok(updated)
    }

    /// Gets the outstanding balance of a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn outstanding(&self, customer_id: CustomerId) -> Result<Decimal, ChequeError> {
        let balance = customer_balances::Entity::find_by_id(customer_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| ChequeError::Database(e.to_string()))?;
        Ok(balance.map_or(Decimal::ZERO, |b| b.outstanding))
    }
}

/// Returns or hands back the open cheques of an order that came back or was
/// cancelled on the road.
///
/// The caller must already hold the order's row lock. Passed cheques are
/// left alone and reported.
pub(crate) async fn return_for_order<C: ConnectionTrait>(
    conn: &C,
    order_id: OrderId,
    date: NaiveDate,
    note: &str,
    actor: UserId,
) -> Result<usize, ChequeError> {
    let linked = cheques::Entity::find()
        .filter(cheques::Column::OrderId.eq(order_id.into_inner()))
        .order_by_asc(cheques::Column::Id)
        .lock_exclusive()
        .all(conn)
        .await
        .map_err(|e| ChequeError::Database(e.to_string()))?;

    let mut settled = 0;
    for row in linked {
        let status = row.status;
        match status {
            DbChequeStatus::Pending | DbChequeStatus::Deposited => {
                let current = load_state(conn, &row).await?;
                let action = ChequeService::return_cheque(
                    &current,
                    date,
                    Some(note.to_string()),
                    ReturnCause::OrderReturned,
                    actor,
                )?;
                apply_action(conn, row, &action).await?;
                settled += 1;
            }
            DbChequeStatus::Passed => {
                warn!(%order_id, cheque_id = %row.id, note, "settled order has a passed cheque");
            }
            DbChequeStatus::Returned => {}
        }
    }
    Ok(settled)
}

async fn lock<C: ConnectionTrait>(
    conn: &C,
    cheque_id: ChequeId,
) -> Result<cheques::Model, ChequeError> {
    cheques::Entity::find_by_id(cheque_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| ChequeError::Database(e.to_string()))?
        .ok_or(ChequeError::NotFound(cheque_id))
}

async fn load_state<C: ConnectionTrait>(
    conn: &C,
    row: &cheques::Model,
) -> Result<ChequeState, ChequeError> {
    let ledger_effect = account::cheque_effect(conn, row.id)
        .await
        .map_err(|e| ChequeError::Database(e.to_string()))?;

    Ok(ChequeState {
        id: ChequeId::from_uuid(row.id),
        amount: row.amount,
        status: row.status.into(),
        deposit_account_id: row.deposit_account_id.map(AccountId::from_uuid),
        customer_id: CustomerId::from_uuid(row.customer_id),
        order_id: row.order_id.map(OrderId::from_uuid),
        ledger_effect,
    })
}

async fn apply_action<C: ConnectionTrait>(
    conn: &C,
    row: cheques::Model,
    action: &ChequeAction,
) -> Result<cheques::Model, ChequeError> {
    for effect in &action.effects {
        apply_effect(conn, action, effect).await?;
    }

    let mut active: cheques::ActiveModel = row.into();
    active.status = Set(action.to.into());
    if let Some(account_id) = action.deposit_account_id {
        active.deposit_account_id = Set(Some(account_id.into_inner()));
    }
    if action.changes_status() {
        match action.to {
            ChequeStatus::Deposited => active.deposited_on = Set(Some(action.date)),
            ChequeStatus::Passed => active.cleared_on = Set(Some(action.date)),
            ChequeStatus::Returned => {
                active.returned_on = Set(Some(action.date));
                active.return_reason = Set(action.reason.clone());
            }
            ChequeStatus::Pending => {}
        }
    }
    active.updated_at = Set(action.occurred_at.into());
    let updated = active
        .update(conn)
        .await
        .map_err(|e| ChequeError::Database(e.to_string()))?;

    history::record(conn, &action.history())
        .await
        .map_err(|e| ChequeError::Database(e.to_string()))?;

    info!(
        cheque_id = %action.cheque_id,
        from = %action.from,
        to = %action.to,
        effects = action.effects.len(),
        "cheque transitioned"
    );
    Ok(updated)
}

async fn apply_effect<C: ConnectionTrait>(
    conn: &C,
    action: &ChequeAction,
    effect: &SettlementEffect,
) -> Result<(), ChequeError> {
    match effect {
        SettlementEffect::AccountDelta {
            account_id,
            amount,
            kind,
        } => {
            let row = account::lock(conn, *account_id)
                .await
                .map_err(|e| ChequeError::Database(e.to_string()))?
                .ok_or(AccountError::NotFound(*account_id))?;
            let posting = AccountService::apply_delta(
                &account::state(&row),
                *amount,
                *kind,
                Some(action.cheque_id),
            )?;
            account::post(conn, row, &posting, action.date, action.reason.clone(), action.actor)
                .await
                .map_err(|e| ChequeError::Database(e.to_string()))?;
        }
        SettlementEffect::CustomerOutstanding { customer_id, delta } => {
            let existing = customer_balances::Entity::find_by_id(customer_id.into_inner())
                .lock_exclusive()
                .one(conn)
                .await
                .map_err(|e| ChequeError::Database(e.to_string()))?;
            let now = Utc::now();
            match existing {
                Some(balance) => {
                    let outstanding = balance.outstanding + *delta;
                    let mut active: customer_balances::ActiveModel = balance.into();
                    active.outstanding = Set(outstanding);
                    active.updated_at = Set(now.into());
                    active.update(conn).await
                }
                None => {
                    customer_balances::ActiveModel {
                        customer_id: Set(customer_id.into_inner()),
                        outstanding: Set(*delta),
                        updated_at: Set(now.into()),
                    }
                    .insert(conn)
                    .await
                }
            }
            .map_err(|e| ChequeError::Database(e.to_string()))?;
        }
        SettlementEffect::OrderPayment { order_id, status } => {
            let order = orders::Entity::find_by_id(order_id.into_inner())
                .lock_exclusive()
                .one(conn)
                .await
                .map_err(|e| ChequeError::Database(e.to_string()))?;
            if let Some(order) = order {
                let version = order.version;
                let mut active: orders::ActiveModel = order.into();
                active.payment_status = Set((*status).into());
                active.version = Set(version + 1);
                active.updated_at = Set(Utc::now().into());
                active
                    .update(conn)
                    .await
                    .map_err(|e| ChequeError::Database(e.to_string()))?;
            } else {
                warn!(%order_id, "cheque is linked to a missing order");
            }
        }
    }
    Ok(())
}
