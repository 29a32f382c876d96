// [apps/config-service/src/handlers/internal.rs]
use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use incidentfox_crypto::{decrypt_dict, mint_impersonation_token, EncryptionKey};
use incidentfox_db::{IntegrationRepository, SchedulerRepository};
use incidentfox_domain::{IntegrationKind, ScheduledJob, ScheduledJobStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// These endpoints are reached only from inside the cluster — the
/// scheduler loop and agent dispatcher are the only callers, never an
/// end-user credential — so they're deliberately not gated behind the
/// [`auth_guard`](crate::middleware::auth_guard) classifier the way the
/// public surface is.
#[derive(Debug, Deserialize)]
pub struct DueJobsQuery {
    pub claimant: String,
    #[serde(default = "default_due_limit")]
    pub limit: u32,
}

fn default_due_limit() -> u32 {
    20
}

/// `GET /api/v1/internal/scheduled-jobs/due` — atomically claims up to
/// `limit` due jobs for `claimant`, used by the scheduler loop's poll.
pub async fn due_scheduled_jobs(
    State(state): State<AppState>,
    Query(query): Query<DueJobsQuery>,
) -> Result<Json<Vec<ScheduledJob>>, ApiError> {
    let connection = state.db.connection()?;
    let scheduler = SchedulerRepository::new(connection);
    let jobs = scheduler.claim_due_jobs(&query.claimant, chrono::Utc::now(), query.limit).await?;
    Ok(Json(jobs))
}

#[derive(Debug, Deserialize)]
pub struct CompleteJobRequest {
    pub status: ScheduledJobStatus,
    pub result: Option<Value>,
}

/// `POST /api/v1/internal/scheduled-jobs/{id}/complete` — reports a
/// claimed job's outcome back to the queue.
pub async fn complete_scheduled_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteJobRequest>,
) -> Result<Json<()>, ApiError> {
    let connection = state.db.connection()?;
    let scheduler = SchedulerRepository::new(connection);
    scheduler.complete(id, req.status, req.result.as_ref()).await?;
    Ok(Json(()))
}

#[derive(Debug, Deserialize)]
pub struct ImpersonateTeamRequest {
    pub node_id: Uuid,
    #[serde(default = "default_impersonation_ttl")]
    pub ttl_seconds: i64,
}

fn default_impersonation_ttl() -> i64 {
    600
}

#[derive(Debug, Serialize)]
pub struct ImpersonationIssued {
    pub token: String,
    pub jti: Uuid,
}

/// `POST /api/v1/internal/impersonate-team` — the dispatcher's path to
/// minting the token an agent run presents to read a team's effective
/// config for the run's duration.
pub async fn impersonate_team(
    State(state): State<AppState>,
    Json(req): Json<ImpersonateTeamRequest>,
) -> Result<Json<ImpersonationIssued>, ApiError> {
    let (token, jti) = mint_impersonation_token(&state.settings.impersonation_jwt_secret, req.node_id, req.ttl_seconds)?;
    Ok(Json(ImpersonationIssued { token, jti }))
}

#[derive(Debug, Deserialize)]
pub struct SlackAppQuery {
    pub node_id: Uuid,
}

/// `GET /api/v1/internal/slack/apps` — the orchestrator's lookup of a
/// node's configured Slack app credentials, decrypted for immediate use
/// rather than left for the caller to decrypt itself.
pub async fn get_slack_app(
    State(state): State<AppState>,
    Query(query): Query<SlackAppQuery>,
) -> Result<Json<Option<Value>>, ApiError> {
    let connection = state.db.connection()?;
    let integrations = IntegrationRepository::new(connection);
    let Some(instance) = integrations.get(query.node_id, IntegrationKind::Slack).await? else {
        return Ok(Json(None));
    };

    let key = EncryptionKey::from_base64(&state.settings.encryption_key)?;
    let decrypted = decrypt_dict(&key, &instance.config)?;
    Ok(Json(Some(decrypted)))
}
