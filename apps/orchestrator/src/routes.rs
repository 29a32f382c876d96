// [apps/orchestrator/src/routes.rs]
use crate::agents;
use crate::middleware::auth_guard;
use crate::provisioning;
use crate::state::AppState;
use crate::webhooks::intake;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// A handful of vendors (Blameless/FireHydrant/Circleback/Vercel/Recall)
/// share one handler body parameterized by vendor name; this wraps it
/// back into a plain 3-extractor route handler per vendor.
fn generic_route(vendor: &'static str, external_kind: &'static str) -> axum::routing::MethodRouter<AppState> {
    post(move |State(state): State<AppState>, headers: HeaderMap, body: Bytes| async move {
        intake::generic_vendor(State(state), headers, body, vendor, external_kind).await
    })
}

/// Assembles the full HTTP surface: public vendor webhook intake (each
/// endpoint authenticates the request itself via its own signature
/// scheme), and the admin-gated provisioning and agent-dispatch routes.
pub fn build_router(state: AppState) -> Router {
    let webhooks: Router<AppState> = Router::new()
        .route("/webhooks/slack", post(intake::slack))
        .route("/webhooks/github", post(intake::github))
        .route("/webhooks/pagerduty", post(intake::pagerduty))
        .route("/webhooks/incidentio", post(intake::incidentio))
        .route("/webhooks/blameless", generic_route("blameless", "blameless_account"))
        .route("/webhooks/firehydrant", generic_route("firehydrant", "firehydrant_account"))
        .route("/webhooks/circleback", generic_route("circleback", "circleback_workspace"))
        .route("/webhooks/vercel", generic_route("vercel", "vercel_project"))
        .route("/webhooks/recall", generic_route("recall", "recall_workspace"))
        .route("/webhooks/google-chat", post(intake::google_chat))
        .route("/webhooks/teams", post(intake::teams));

    let admin = Router::new()
        .route("/api/v1/admin/provision/team", post(provisioning::provision_team))
        .route("/api/v1/admin/agents/run", post(agents::run_agent))
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .merge(webhooks)
        .merge(admin)
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
