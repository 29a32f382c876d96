// [apps/orchestrator/src/middleware.rs]
use crate::auth;
use crate::errors::OrchestratorError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

/// Classifies the request's bearer credential into a [`Principal`] and
/// inserts it into the request extensions for handlers to pull out via
/// `Extension<Principal>`.
pub async fn auth_guard(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, OrchestratorError> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(OrchestratorError::PermissionDenied)?;

    let principal = auth::classify(bearer, &state)?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
