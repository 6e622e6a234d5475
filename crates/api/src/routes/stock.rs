//! Stock ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use haulbook_core::stock::{AdjustmentLine, DamageLine, TransferLine};
use haulbook_db::StockRepository;
use haulbook_db::repositories::ReceivePurchaseInput;
use haulbook_shared::types::{LocationId, PageRequest, ProductId};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::Actor};

/// Creates the stock routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchases", post(receive_purchase))
        .route("/locations/{location_id}/damage", post(report_damage))
        .route("/locations/{location_id}/adjustments", post(adjust_stock))
        .route("/locations/{location_id}/movements", get(list_movements))
        .route(
            "/locations/{location_id}/stock/{product_id}",
            get(get_stock_position),
        )
        .route("/stock-transfers", post(transfer_stock))
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for reporting damaged stock.
#[derive(Debug, Deserialize, Validate)]
pub struct ReportDamageRequest {
    /// Damaged quantities per product.
    #[validate(length(min = 1))]
    pub lines: Vec<DamageLine>,
    /// What happened, beyond the per-line damage types.
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Body for a stock count adjustment.
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockRequest {
    /// Counted quantities per product.
    #[validate(length(min = 1))]
    pub lines: Vec<AdjustmentLine>,
    /// Why the count differs.
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Body for moving stock between locations.
#[derive(Debug, Deserialize, Validate)]
pub struct TransferStockRequest {
    /// Source location.
    pub from_location_id: LocationId,
    /// Destination location.
    pub to_location_id: LocationId,
    /// Quantities per product.
    #[validate(length(min = 1))]
    pub lines: Vec<TransferLine>,
}

/// Query parameters for listing movements.
#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    /// Restrict to one product.
    pub product_id: Option<ProductId>,
    /// Page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default)]
    pub per_page: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/purchases` - Receive a supplier purchase into stock.
async fn receive_purchase(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<ReceivePurchaseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = StockRepository::new((*state.db).clone())
        .receive_purchase(input, actor.id())
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// POST `/locations/{location_id}/damage` - Move good stock to damaged.
async fn report_damage(
    State(state): State<AppState>,
    actor: Actor,
    Path(location_id): Path<LocationId>,
    ValidatedJson(request): ValidatedJson<ReportDamageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let positions = StockRepository::new((*state.db).clone())
        .report_damage(
            location_id,
            &request.lines,
            request.reason.as_deref(),
            actor.id(),
        )
        .await?;
    Ok(Json(positions))
}

/// POST `/locations/{location_id}/adjustments` - Set good stock to a count.
async fn adjust_stock(
    State(state): State<AppState>,
    actor: Actor,
    Path(location_id): Path<LocationId>,
    ValidatedJson(request): ValidatedJson<AdjustStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let positions = StockRepository::new((*state.db).clone())
        .adjust(
            location_id,
            &request.lines,
            request.reason.as_deref(),
            actor.id(),
        )
        .await?;
    Ok(Json(positions))
}

/// POST `/stock-transfers` - Move good stock between two locations.
async fn transfer_stock(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<TransferStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let positions = StockRepository::new((*state.db).clone())
        .transfer(
            request.from_location_id,
            request.to_location_id,
            &request.lines,
            actor.id(),
        )
        .await?;
    Ok(Json(positions))
}

/// GET `/locations/{location_id}/stock/{product_id}`
async fn get_stock_position(
    State(state): State<AppState>,
    Path((location_id, product_id)): Path<(LocationId, ProductId)>,
) -> Result<impl IntoResponse, ApiError> {
    let position = StockRepository::new((*state.db).clone())
        .position(location_id, product_id)
        .await?;
    Ok(Json(position))
}

/// GET `/locations/{location_id}/movements` - Movement ledger, newest first.
async fn list_movements(
    State(state): State<AppState>,
    Path(location_id): Path<LocationId>,
    Query(query): Query<MovementQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let movements = StockRepository::new((*state.db).clone())
        .list_movements(location_id, query.product_id, page)
        .await?;
    Ok(Json(movements))
}
