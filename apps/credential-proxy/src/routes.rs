// [apps/credential-proxy/src/routes.rs]
use crate::handlers;
use crate::state::AppState;
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Every route here is sandbox-JWT authenticated inside the handler
/// itself — there is no separate auth middleware layer, since the proxy
/// has exactly two endpoint shapes and both need the claims directly.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/messages", post(handlers::messages))
        .route("/:provider/*rest", any(handlers::proxy))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
