//! Free-issue claim routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use haulbook_db::ClaimRepository;
use haulbook_db::repositories::ConvertClaimsInput;
use haulbook_shared::types::BusinessUnitId;
use serde::Deserialize;

use crate::{AppState, error::ApiError, middleware::Actor};

/// Creates the claim routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/claims", get(list_claimable))
        .route("/claims/conversions", post(convert_claims))
}

/// Query parameters for listing claimable lines.
#[derive(Debug, Deserialize)]
pub struct ClaimQuery {
    /// Restrict to one business unit.
    pub business_unit_id: Option<BusinessUnitId>,
}

fn claim_repository(state: &AppState) -> ClaimRepository {
    ClaimRepository::new((*state.db).clone())
        .with_prefix(state.engine.claim_purchase_prefix.clone())
}

/// GET `/claims` - Unclaimed free-issue lines.
async fn list_claimable(
    State(state): State<AppState>,
    Query(query): Query<ClaimQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = claim_repository(&state)
        .list_claimable(query.business_unit_id)
        .await?;
    Ok(Json(items))
}

/// POST `/claims/conversions` - Turn selected claims into a zero-cost purchase.
async fn convert_claims(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<ConvertClaimsInput>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = claim_repository(&state).convert(input, actor.id()).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}
