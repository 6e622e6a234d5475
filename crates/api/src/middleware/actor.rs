//! Actor identification for mutating routes.
//!
//! Identity is established upstream; the gateway forwards the operator's id
//! in the `x-actor-id` header and every recorded transition carries it.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderName, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use haulbook_shared::types::UserId;

use crate::error::ApiError;

/// Header carrying the acting operator's id.
pub static ACTOR_HEADER: HeaderName = HeaderName::from_static("x-actor-id");

/// Parses the actor header when present.
///
/// A malformed header is rejected here so handlers never see it. A missing
/// header is left to the [`Actor`] extractor, which only mutating handlers use.
pub async fn actor_middleware(mut request: Request, next: Next) -> Response {
    let Some(value) = request.headers().get(&ACTOR_HEADER) else {
        return next.run(request).await;
    };

    match value.to_str().ok().and_then(|v| v.trim().parse::<UserId>().ok()) {
        Some(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        None => ApiError::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_ACTOR",
            "x-actor-id must be a UUID",
        )
        .into_response(),
    }
}

/// Extractor for the operator performing a request.
///
/// ```ignore
/// async fn handler(actor: Actor) -> impl IntoResponse {
///     let user_id = actor.id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub UserId);

impl Actor {
    /// Returns the operator's id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserId>()
            .copied()
            .map(Actor)
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "MISSING_ACTOR",
                    "x-actor-id header is required",
                )
            })
    }
}
