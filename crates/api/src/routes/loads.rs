//! Load sheet and reconciliation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use haulbook_core::load::NewLoad;
use haulbook_core::reconciliation::OrderUpdate;
use haulbook_db::{LoadRepository, ReconciliationRepository};
use haulbook_shared::types::{LoadId, OrderId, PersonId, VehicleId};
use serde::Deserialize;
use validator::Validate;

use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::Actor};

/// Creates the load routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loads", post(create_load))
        .route("/loads/{load_id}", get(get_load))
        .route("/loads/{load_id}/reconciliation", post(finalize_reconciliation))
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for creating a load.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoadRequest {
    /// Orders to dispatch, in manifest order.
    #[validate(length(min = 1))]
    pub order_ids: Vec<OrderId>,
    /// Vehicle carrying the load.
    pub vehicle_id: VehicleId,
    /// Driver or salesperson responsible.
    pub responsible_person_id: PersonId,
    /// Optional helper.
    pub helper_id: Option<PersonId>,
    /// Dispatch date.
    pub load_date: NaiveDate,
}

/// Body for finalizing a load.
#[derive(Debug, Deserialize)]
pub struct FinalizeReconciliationRequest {
    /// Asserted outcome per order.
    pub updates: Vec<OrderUpdate>,
    /// Close the load after applying the updates.
    #[serde(default)]
    pub close_load: bool,
}

// ============================================================================
// Handlers
// ============================================================================

fn load_repository(state: &AppState) -> LoadRepository {
    LoadRepository::new((*state.db).clone()).with_numbering(
        state.engine.load_number_prefix.clone(),
        state.engine.load_number_width,
    )
}

/// POST `/loads` - Dispatch loading orders on a new load sheet.
async fn create_load(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateLoadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_load = NewLoad {
        vehicle_id: request.vehicle_id,
        responsible_person_id: request.responsible_person_id,
        helper_id: request.helper_id,
        load_date: request.load_date,
    };
    let detail = load_repository(&state)
        .create(&request.order_ids, new_load, actor.id())
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET `/loads/{load_id}` - Get a load sheet with its orders.
async fn get_load(
    State(state): State<AppState>,
    Path(load_id): Path<LoadId>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = load_repository(&state).find(load_id).await?;
    Ok(Json(detail))
}

/// POST `/loads/{load_id}/reconciliation` - Apply delivery outcomes.
///
/// Updates for orders that are unknown or no longer on the load are skipped
/// and reported per order rather than failing the batch.
async fn finalize_reconciliation(
    State(state): State<AppState>,
    actor: Actor,
    Path(load_id): Path<LoadId>,
    Json(request): Json<FinalizeReconciliationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let report = ReconciliationRepository::new((*state.db).clone())
        .finalize(load_id, &request.updates, request.close_load, actor.id())
        .await?;
    Ok(Json(report))
}
