//! Transition history routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use haulbook_core::history::EntityKind;
use haulbook_db::HistoryRepository;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Creates the history routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/history/{entity_kind}/{entity_id}", get(list_history))
}

/// GET `/history/{entity_kind}/{entity_id}` - Transitions of one order,
/// cheque or load, oldest first.
async fn list_history(
    State(state): State<AppState>,
    Path((entity_kind, entity_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = EntityKind::parse(&entity_kind).ok_or_else(|| {
        ApiError::validation(format!("Unknown entity kind: {entity_kind}"))
    })?;
    let records = HistoryRepository::new((*state.db).clone())
        .list(kind, entity_id)
        .await?;
    Ok(Json(records))
}
