//! Order routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use haulbook_db::OrderRepository;
use haulbook_db::repositories::PlaceOrderInput;
use haulbook_shared::types::OrderId;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::Actor};

/// Creates the order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(place_order))
        .route("/orders/{order_id}", get(get_order))
        .route("/orders/{order_id}/approve", post(approve_order))
        .route("/orders/{order_id}/send-to-qc", post(send_to_qc))
        .route("/orders/{order_id}/pass-qc", post(pass_qc))
        .route("/orders/{order_id}/reject", post(reject_order))
        .route("/orders/{order_id}/invoice", put(attach_invoice))
        .route("/orders/{order_id}/invoice-amount", put(edit_invoice_amount))
}

// ============================================================================
// Request Types
// ============================================================================

/// Optional body for passing quality check.
#[derive(Debug, Default, Deserialize)]
pub struct PassQcRequest {
    /// Pass even though verification is incomplete.
    #[serde(default)]
    pub forced: bool,
}

/// Optional body for rejecting an order.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RejectOrderRequest {
    /// Why the order is rejected.
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Body for attaching an invoice number.
#[derive(Debug, Deserialize, Validate)]
pub struct AttachInvoiceRequest {
    /// Invoice number issued for the order.
    #[validate(length(min = 1, max = 64))]
    pub invoice_number: String,
}

/// Body for editing the invoice total.
#[derive(Debug, Deserialize)]
pub struct EditInvoiceAmountRequest {
    /// New invoice total.
    pub total_amount: Decimal,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/orders` - Place an order.
async fn place_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<PlaceOrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = OrderRepository::new((*state.db).clone())
        .place(input, actor.id())
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET `/orders/{order_id}` - Get an order with its lines and amount ledger.
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = OrderRepository::new((*state.db).clone())
        .find(order_id)
        .await?;
    Ok(Json(detail))
}

/// POST `/orders/{order_id}/approve` - Pending → Processing.
async fn approve_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderRepository::new((*state.db).clone())
        .approve(order_id, actor.id())
        .await?;
    Ok(Json(order))
}

/// POST `/orders/{order_id}/send-to-qc` - Processing → Checking.
async fn send_to_qc(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderRepository::new((*state.db).clone())
        .send_to_qc(order_id, actor.id())
        .await?;
    Ok(Json(order))
}

/// POST `/orders/{order_id}/pass-qc` - Checking → Loading.
async fn pass_qc(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<OrderId>,
    body: Option<Json<PassQcRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let order = OrderRepository::new((*state.db).clone())
        .pass_qc(order_id, actor.id(), request.forced)
        .await?;
    Ok(Json(order))
}

/// POST `/orders/{order_id}/reject` - Cancel an order before dispatch.
async fn reject_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<OrderId>,
    body: Option<Json<RejectOrderRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.unwrap_or_default();
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;
    let order = OrderRepository::new((*state.db).clone())
        .reject(order_id, actor.id(), request.reason)
        .await?;
    Ok(Json(order))
}

/// PUT `/orders/{order_id}/invoice` - Attach the invoice number once.
async fn attach_invoice(
    State(state): State<AppState>,
    _actor: Actor,
    Path(order_id): Path<OrderId>,
    ValidatedJson(request): ValidatedJson<AttachInvoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderRepository::new((*state.db).clone())
        .attach_invoice(order_id, &request.invoice_number)
        .await?;
    Ok(Json(order))
}

/// PUT `/orders/{order_id}/invoice-amount` - Edit the invoice total.
///
/// The dispatched amount snapshot is never touched.
async fn edit_invoice_amount(
    State(state): State<AppState>,
    actor: Actor,
    Path(order_id): Path<OrderId>,
    Json(request): Json<EditInvoiceAmountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderRepository::new((*state.db).clone())
        .edit_invoice_amount(order_id, request.total_amount, actor.id())
        .await?;
    Ok(Json(order))
}
