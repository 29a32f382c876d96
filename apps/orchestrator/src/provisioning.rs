// [apps/orchestrator/src/provisioning.rs]
use crate::errors::OrchestratorError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use incidentfox_crypto::{generate_opaque_token, hash_token};
use incidentfox_db::{AuditRepository, DbError, NodeRepository, ProvisioningRepository, RoutingRepository, TokenRepository};
use incidentfox_domain::{OpaqueToken, Permission, Principal, ProvisioningRun, ProvisioningStatus};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ProvisionTeamRequest {
    pub org_id: Uuid,
    pub team_node_id: Uuid,
    #[serde(default)]
    pub slack_channel_ids: Vec<String>,
    pub idempotency_key: String,
}

/// `POST /api/v1/admin/provision/team` — binds a team node to its Slack
/// channels, issues a team token, and calls the agent runtime's
/// bootstrap endpoint. Idempotent on `(org_id, team_node_id,
/// idempotency_key)`: a retried delivery of the same webhook lands on
/// the same [`ProvisioningRun`] instead of re-running the steps below.
pub async fn provision_team(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ProvisionTeamRequest>,
) -> Result<Response, OrchestratorError> {
    if !principal.has(Permission::AdminProvision) && !principal.has(Permission::AdminWildcard) {
        return Err(OrchestratorError::PermissionDenied);
    }

    let provisioning = ProvisioningRepository::new(state.db.connection()?);
    let run = provisioning.claim_or_fetch(Uuid::new_v4(), req.org_id, Some(req.team_node_id), &req.idempotency_key).await?;

    if run.status != ProvisioningStatus::Pending {
        return Ok(Json(run).into_response());
    }

    match execute(&state, &req, run.id).await {
        Ok(()) => {
            provisioning.complete(run.id, ProvisioningStatus::Completed, None).await?;
            let completed = provisioning.get(run.id).await?;
            Ok(Json(completed).into_response())
        }
        Err(OrchestratorError::Db(DbError::RoutingConflict { .. })) => {
            provisioning.complete(run.id, ProvisioningStatus::Failed, Some("slack_channel_already_mapped")).await?;
            let failed = provisioning.get(run.id).await?;
            Ok(conflict_response(&failed))
        }
        Err(e) => {
            provisioning.complete(run.id, ProvisioningStatus::Failed, Some(&e.to_string())).await?;
            warn!(run_id = %run.id, error = %e, "provisioning run failed");
            Err(e)
        }
    }
}

fn conflict_response(run: &ProvisioningRun) -> Response {
    let mut response = (StatusCode::CONFLICT, Json(json!({ "status": run.status, "error": run.error, "provisioning_run_id": run.id }))).into_response();
    response.headers_mut().insert(
        HeaderName::from_static("x-provisioning-run-id"),
        HeaderValue::from_str(&run.id.to_string()).expect("uuid is a valid header value"),
    );
    response
}

async fn execute(state: &AppState, req: &ProvisionTeamRequest, run_id: Uuid) -> Result<(), OrchestratorError> {
    let routing = RoutingRepository::new(state.db.connection()?);
    for channel_id in &req.slack_channel_ids {
        routing.bind(req.org_id, req.team_node_id, "slack_channel", channel_id).await?;
    }

    let tokens = TokenRepository::new(state.db.connection()?);
    let (id, secret) = generate_opaque_token();
    let token_id = Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4());
    let pepper = state.settings.token_pepper.as_deref().unwrap_or("");
    let secret_hash = hash_token(pepper, &secret);
    tokens.create_team_token(token_id, req.team_node_id, "auto-provisioned", &secret_hash, &["agent:invoke".to_string()]).await?;
    let team_token = OpaqueToken { id: token_id.to_string(), secret }.to_wire();

    let node = NodeRepository::new(state.db.connection()?).get_node(req.team_node_id).await?;

    let bootstrap_url = format!("{}/v1/bootstrap", state.settings.agent_runtime_base_url.trim_end_matches('/'));
    let bootstrap_response = state
        .http
        .post(&bootstrap_url)
        .bearer_auth(&team_token)
        .json(&json!({ "team_node_id": node.id, "team_name": node.name }))
        .send()
        .await?;
    if !bootstrap_response.status().is_success() {
        warn!(status = %bootstrap_response.status(), "agent runtime bootstrap call returned a non-success status");
    }

    let audit = AuditRepository::new(state.db.connection()?);
    audit
        .record(
            Uuid::new_v4(),
            Some(req.team_node_id),
            None,
            "orchestrator",
            "provisioning.succeeded",
            &json!({ "run_id": run_id, "slack_channel_ids": req.slack_channel_ids }),
        )
        .await?;

    info!(%run_id, node_id = %req.team_node_id, "team provisioned");
    Ok(())
}
