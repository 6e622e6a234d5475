//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::actor_middleware};

pub mod accounts;
pub mod cheques;
pub mod claims;
pub mod health;
pub mod history;
pub mod loads;
pub mod orders;
pub mod stock;

/// Creates the API router with all routes.
///
/// Business routes run behind the actor middleware; health stays public.
pub fn api_routes() -> Router<AppState> {
    let business_routes = Router::new()
        .merge(orders::routes())
        .merge(loads::routes())
        .merge(cheques::routes())
        .merge(accounts::routes())
        .merge(stock::routes())
        .merge(claims::routes())
        .merge(history::routes())
        .layer(middleware::from_fn(actor_middleware));

    Router::new().merge(health::routes()).merge(business_routes)
}
