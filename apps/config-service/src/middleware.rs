// [apps/config-service/src/middleware.rs]
use crate::auth;
use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

/// Classifies the request's bearer credential into a [`Principal`] and
/// inserts it into the request extensions for handlers to pull out via
/// `Extension<Principal>`. Requests with no or unrecognized credential
/// are rejected here rather than left for each handler to re-check.
pub async fn auth_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::MissingToken)?;

    let principal = auth::classify(bearer, &state).await?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
