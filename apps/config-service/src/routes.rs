// [apps/config-service/src/routes.rs]
use crate::handlers::{admin, config, internal};
use crate::middleware::auth_guard;
use crate::state::AppState;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assembles the full HTTP surface. The public and admin routes sit
/// behind [`auth_guard`]; the internal routes are only ever reached
/// from inside the cluster and authenticate the caller by network
/// boundary rather than by bearer credential.
pub fn build_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/api/v1/auth/me", get(config::get_auth_me))
        .route("/api/v1/config/me/effective", get(config::get_my_effective_config))
        .route("/api/v1/config/me", put(config::update_my_config))
        .route("/api/v1/admin/orgs", post(admin::create_org))
        .route("/api/v1/admin/orgs/:org_id/nodes", post(admin::create_node))
        .route("/api/v1/admin/nodes/:node_id/config", patch(config::patch_node_config))
        .route("/api/v1/admin/nodes/:node_id/config/effective", get(config::get_node_effective_config))
        .route("/api/v1/admin/nodes/:node_id/tokens", post(admin::issue_team_token))
        .route("/api/v1/admin/nodes/:node_id/impersonation-token", post(admin::mint_node_impersonation_token))
        .route("/api/v1/admin/orgs/:org_id/tokens", post(admin::issue_org_admin_token))
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_guard));

    let internal_routes = Router::new()
        .route("/api/v1/internal/scheduled-jobs/due", get(internal::due_scheduled_jobs))
        .route("/api/v1/internal/scheduled-jobs/:id/complete", post(internal::complete_scheduled_job))
        .route("/api/v1/internal/impersonate-team", post(internal::impersonate_team))
        .route("/api/v1/internal/slack/apps", get(internal::get_slack_app));

    Router::new()
        .merge(authenticated)
        .merge(internal_routes)
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
