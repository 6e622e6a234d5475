//! Account repository for bank and cash accounts.
//!
//! Balances only change through [`post`], which writes the new balance and
//! its ledger entry together.

use chrono::{NaiveDate, Utc};
use haulbook_core::account::{
    AccountError, AccountService, AccountState, AccountType, LedgerPosting,
};
use haulbook_shared::types::{AccountId, PageRequest, PageResponse, TransferId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::{account_entries, accounts};

/// Input for opening an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccountInput {
    /// Display name.
    pub name: String,
    /// Kind of account.
    pub account_type: AccountType,
    /// Balance at opening.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Whether the balance may go below zero.
    #[serde(default)]
    pub allow_overdraft: bool,
    /// Opaque bank reference.
    #[serde(default)]
    pub bank_code: Option<String>,
}

/// Input for moving money between two accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferInput {
    /// Account debited.
    pub from_account_id: AccountId,
    /// Account credited.
    pub to_account_id: AccountId,
    /// Amount moved, positive.
    pub amount: Decimal,
    /// Value date.
    pub date: NaiveDate,
    /// Optional note copied to both entries.
    #[serde(default)]
    pub note: Option<String>,
}

/// Both sides of a completed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    /// Identifier shared by the two entries.
    pub transfer_id: TransferId,
    /// Debited account after the transfer.
    pub from: accounts::Model,
    /// Credited account after the transfer.
    pub to: accounts::Model,
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens an account and records its opening entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the opening balance is negative
    /// on an account without overdraft, or the database operation fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn open(
        &self,
        input: OpenAccountInput,
        actor: UserId,
    ) -> Result<accounts::Model, AccountError> {
        let account_id = AccountId::new();
        let state = AccountState {
            id: account_id,
            balance: input.opening_balance,
            allow_overdraft: input.allow_overdraft,
        };
        let posting = AccountService::open(&input.name, &state)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let now = Utc::now();
        let account = accounts::ActiveModel {
            id: Set(account_id.into_inner()),
            name: Set(input.name.trim().to_string()),
            account_type: Set(input.account_type.into()),
            balance: Set(input.opening_balance),
            allow_overdraft: Set(input.allow_overdraft),
            bank_code: Set(input.bank_code),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?;

        insert_entry(&txn, &posting, now.date_naive(), None, actor)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        info!(%account_id, balance = %account.balance, "account opened");
        Ok(account)
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotFound` if the account does not exist.
    pub async fn find(&self, account_id: AccountId) -> Result<accounts::Model, AccountError> {
        accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::NotFound(account_id))
    }

    /// Lists the ledger entries of an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the query fails.
    pub async fn list_entries(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<PageResponse<account_entries::Model>, AccountError> {
        self.find(account_id).await?;
        let page = page.normalized();

        let query = account_entries::Entity::find()
            .filter(account_entries::Column::AccountId.eq(account_id.into_inner()));

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let entries = query
            .order_by_desc(account_entries::Column::CreatedAt)
            .order_by_desc(account_entries::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        Ok(PageResponse::new(entries, page, total))
    }

    /// Records cash paid into an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing or the amount is not positive.
    #[instrument(skip(self, note))]
    pub async fn deposit_cash(
        &self,
        account_id: AccountId,
        amount: Decimal,
        date: NaiveDate,
        note: Option<String>,
        actor: UserId,
    ) -> Result<accounts::Model, AccountError> {
        self.single(account_id, date, note, actor, |state| {
            AccountService::deposit(state, amount)
        })
        .await
    }

    /// Records cash taken out of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, the amount is not positive
    /// or the balance cannot cover it.
    #[instrument(skip(self, note))]
    pub async fn withdraw_cash(
        &self,
        account_id: AccountId,
        amount: Decimal,
        date: NaiveDate,
        note: Option<String>,
        actor: UserId,
    ) -> Result<accounts::Model, AccountError> {
        self.single(account_id, date, note, actor, |state| {
            AccountService::withdraw(state, amount)
        })
        .await
    }

    /// Moves money between two accounts.
    ///
    /// Both rows are locked in ascending id order. On failure neither balance
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both sides are the same account
    /// - Either account is missing
    /// - The amount is not positive
    /// - The source balance cannot cover the amount
    /// - Database operation fails
    #[instrument(skip(self, input), fields(from = %input.from_account_id, to = %input.to_account_id, amount = %input.amount))]
    pub async fn transfer(
        &self,
        input: TransferInput,
        actor: UserId,
    ) -> Result<TransferResult, AccountError> {
        if input.from_account_id == input.to_account_id {
            return Err(AccountError::SameAccount(input.from_account_id));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let [first, second] = AccountService::lock_order(input.from_account_id, input.to_account_id);
        let first_row = lock(&txn, first)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::NotFound(first))?;
        let second_row = lock(&txn, second)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::NotFound(second))?;

        let (from_row, to_row) = if first == input.from_account_id {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };

        let transfer_id = TransferId::new();
        let plan = AccountService::transfer(
            &state(&from_row),
            &state(&to_row),
            input.amount,
            transfer_id,
        )?;

        let from = post(&txn, from_row, &plan.debit, input.date, input.note.clone(), actor)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;
        let to = post(&txn, to_row, &plan.credit, input.date, input.note, actor)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        info!(%transfer_id, "transfer posted");
        Ok(TransferResult {
            transfer_id,
            from,
            to,
        })
    }

    async fn single<F>(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        note: Option<String>,
        actor: UserId,
        decide: F,
    ) -> Result<accounts::Model, AccountError>
    where
        F: FnOnce(&AccountState) -> Result<LedgerPosting, AccountError>,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        let row = lock(&txn, account_id)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?
            .ok_or(AccountError::NotFound(account_id))?;
        let posting = decide(&state(&row))?;

        let updated = post(&txn, row, &posting, date, note, actor)
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AccountError::Database(e.to_string()))?;

        info!(%account_id, kind = %posting.kind, amount = %posting.amount, "account posted");
        Ok(updated)
    }
}

/// Reads an account row for update.
pub(crate) async fn lock<C: ConnectionTrait>(
    conn: &C,
    account_id: AccountId,
) -> Result<Option<accounts::Model>, DbErr> {
    accounts::Entity::find_by_id(account_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
}

/// Builds the core view of an account row.
pub(crate) fn state(row: &accounts::Model) -> AccountState {
    AccountState {
        id: AccountId::from_uuid(row.id),
        balance: row.balance,
        allow_overdraft: row.allow_overdraft,
    }
}

/// Writes a posting: the new balance and its ledger entry.
pub(crate) async fn post<C: ConnectionTrait>(
    conn: &C,
    row: accounts::Model,
    posting: &LedgerPosting,
    date: NaiveDate,
    note: Option<String>,
    actor: UserId,
) -> Result<accounts::Model, DbErr> {
    let mut active: accounts::ActiveModel = row.into();
    active.balance = Set(posting.balance_after);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(conn).await?;

    insert_entry(conn, posting, date, note, actor).await?;
    Ok(updated)
}

/// Sum of the entries an account received for one cheque.
pub(crate) async fn cheque_effect<C: ConnectionTrait>(
    conn: &C,
    cheque_id: Uuid,
) -> Result<Decimal, DbErr> {
    let entries = account_entries::Entity::find()
        .filter(account_entries::Column::ChequeId.eq(cheque_id))
        .all(conn)
        .await?;
    Ok(entries.iter().map(|e| e.amount).sum())
}

async fn insert_entry<C: ConnectionTrait>(
    conn: &C,
    posting: &LedgerPosting,
    date: NaiveDate,
    note: Option<String>,
    actor: UserId,
) -> Result<(), DbErr> {
    account_entries::ActiveModel {
        id: Set(Uuid::now_v7()),
        account_id: Set(posting.account_id.into_inner()),
        kind: Set(posting.kind.into()),
        amount: Set(posting.amount),
        balance_after: Set(posting.balance_after),
        transfer_id: Set(posting.transfer_id.map(|id| id.into_inner())),
        cheque_id: Set(posting.cheque_id.map(|id| id.into_inner())),
        entry_date: Set(date),
        note: Set(note),
        actor_id: Set(actor.into_inner()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    Ok(())
}
