//! Account ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use haulbook_db::AccountRepository;
use haulbook_db::repositories::{OpenAccountInput, TransferInput};
use haulbook_shared::types::{AccountId, PageRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::Actor};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(open_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/entries", get(list_entries))
        .route("/accounts/{account_id}/deposits", post(deposit_cash))
        .route("/accounts/{account_id}/withdrawals", post(withdraw_cash))
        .route("/transfers", post(transfer_funds))
}

/// Body for a cash deposit or withdrawal.
#[derive(Debug, Deserialize, Validate)]
pub struct CashMovementRequest {
    /// Amount moved; must be positive.
    pub amount: Decimal,
    /// Business date.
    pub date: NaiveDate,
    /// Free-text note.
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// POST `/accounts` - Open an account with its opening balance.
async fn open_account(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<OpenAccountInput>,
) -> Result<impl IntoResponse, ApiError> {
    let account = AccountRepository::new((*state.db).clone())
        .open(input, actor.id())
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/accounts/{account_id}`
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let account = AccountRepository::new((*state.db).clone())
        .find(account_id)
        .await?;
    Ok(Json(account))
}

/// GET `/accounts/{account_id}/entries` - Ledger entries, newest first.
async fn list_entries(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = AccountRepository::new((*state.db).clone())
        .list_entries(account_id, page)
        .await?;
    Ok(Json(entries))
}

/// POST `/accounts/{account_id}/deposits` - Pay cash in.
async fn deposit_cash(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_id): Path<AccountId>,
    ValidatedJson(request): ValidatedJson<CashMovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = AccountRepository::new((*state.db).clone())
        .deposit_cash(
            account_id,
            request.amount,
            request.date,
            request.note,
            actor.id(),
        )
        .await?;
    Ok(Json(account))
}

/// POST `/accounts/{account_id}/withdrawals` - Take cash out.
async fn withdraw_cash(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_id): Path<AccountId>,
    ValidatedJson(request): ValidatedJson<CashMovementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = AccountRepository::new((*state.db).clone())
        .withdraw_cash(
            account_id,
            request.amount,
            request.date,
            request.note,
            actor.id(),
        )
        .await?;
    Ok(Json(account))
}

/// POST `/transfers` - Move funds between two accounts atomically.
async fn transfer_funds(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<TransferInput>,
) -> Result<impl IntoResponse, ApiError> {
    let result = AccountRepository::new((*state.db).clone())
        .transfer(input, actor.id())
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}
