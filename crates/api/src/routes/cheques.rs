//! Cheque registry routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use haulbook_core::cheque::NewCheque;
use haulbook_db::ChequeRepository;
use haulbook_shared::types::{AccountId, ChequeId, CustomerId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::Actor};

/// Creates the cheque routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cheques", post(register_cheque))
        .route("/cheques/{cheque_id}", get(get_cheque))
        .route("/cheques/{cheque_id}/deposit", post(deposit_cheque))
        .route("/cheques/{cheque_id}/clear", post(clear_cheque))
        .route("/cheques/{cheque_id}/return", post(return_cheque))
        .route("/customers/{customer_id}/outstanding", get(customer_outstanding))
}

/// Body for depositing a cheque.
#[derive(Debug, Deserialize)]
pub struct DepositChequeRequest {
    /// Account the cheque is banked into.
    pub account_id: AccountId,
    /// Deposit date.
    pub date: NaiveDate,
}

/// Body for clearing a cheque.
#[derive(Debug, Deserialize)]
pub struct ClearChequeRequest {
    /// Clearance date.
    pub date: NaiveDate,
}

/// Body for returning a cheque.
#[derive(Debug, Deserialize, Validate)]
pub struct ReturnChequeRequest {
    /// Return date.
    pub date: NaiveDate,
    /// Bank or operator reason.
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Outstanding balance of a customer.
#[derive(Debug, Serialize)]
pub struct OutstandingResponse {
    /// The customer.
    pub customer_id: CustomerId,
    /// Amount owed from returned cheques.
    pub outstanding: Decimal,
}

/// POST `/cheques` - Register a cheque received against a payment.
async fn register_cheque(
    State(state): State<AppState>,
    actor: Actor,
    Json(cheque): Json<NewCheque>,
) -> Result<impl IntoResponse, ApiError> {
    let cheque = ChequeRepository::new((*state.db).clone())
        .register(cheque, actor.id())
        .await?;
    Ok((StatusCode::CREATED, Json(cheque)))
}

/// GET `/cheques/{cheque_id}`
async fn get_cheque(
    State(state): State<AppState>,
    Path(cheque_id): Path<ChequeId>,
) -> Result<impl IntoResponse, ApiError> {
    let cheque = ChequeRepository::new((*state.db).clone())
        .find(cheque_id)
        .await?;
    Ok(Json(cheque))
}

/// POST `/cheques/{cheque_id}/deposit` - Pending → Deposited.
async fn deposit_cheque(
    State(state): State<AppState>,
    actor: Actor,
    Path(cheque_id): Path<ChequeId>,
    Json(request): Json<DepositChequeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cheque = ChequeRepository::new((*state.db).clone())
        .deposit(cheque_id, request.account_id, request.date, actor.id())
        .await?;
    Ok(Json(cheque))
}

/// POST `/cheques/{cheque_id}/clear` - Deposited → Passed, crediting the account.
async fn clear_cheque(
    State(state): State<AppState>,
    actor: Actor,
    Path(cheque_id): Path<ChequeId>,
    Json(request): Json<ClearChequeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cheque = ChequeRepository::new((*state.db).clone())
        .clear(cheque_id, request.date, actor.id())
        .await?;
    Ok(Json(cheque))
}

/// POST `/cheques/{cheque_id}/return` - Bounce a deposited cheque or hand back
/// a pending one.
async fn return_cheque(
    State(state): State<AppState>,
    actor: Actor,
    Path(cheque_id): Path<ChequeId>,
    ValidatedJson(request): ValidatedJson<ReturnChequeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cheque = ChequeRepository::new((*state.db).clone())
        .return_cheque(cheque_id, request.date, request.reason, actor.id())
        .await?;
    Ok(Json(cheque))
}

/// GET `/customers/{customer_id}/outstanding`
async fn customer_outstanding(
    State(state): State<AppState>,
    Path(customer_id): Path<CustomerId>,
) -> Result<impl IntoResponse, ApiError> {
    let outstanding = ChequeRepository::new((*state.db).clone())
        .outstanding(customer_id)
        .await?;
    Ok(Json(OutstandingResponse {
        customer_id,
        outstanding,
    }))
}
