// [apps/orchestrator/src/dispatcher.rs]
use crate::auth;
use crate::errors::OrchestratorError;
use crate::state::AppState;
use incidentfox_agent_client::AgentEvent;
use incidentfox_crypto::{mint_impersonation_token, mint_sandbox_token, IMPERSONATION_MAX_TTL_SECONDS};
use incidentfox_db::{AuditRepository, RunRepository};
use incidentfox_domain::{Destination, TriggerSource};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

/// Default turn ceiling for callers that have no stronger opinion —
/// callers decide this, `run_agent` no longer hardcodes it.
pub const DEFAULT_MAX_TURNS: u32 = 20;

pub struct DispatchOutcome {
    pub run_id: Uuid,
    pub node_id: Uuid,
    pub success: bool,
    pub result_text: Option<String>,
    pub output_destinations: Vec<Destination>,
}

/// Maps a trigger's wire tag to the [`TriggerSource`] the output resolver
/// understands. `None` for triggers the resolver has no concept of yet
/// (chat surfaces, scheduled runs) — callers skip fan-out for those
/// rather than guessing a source.
pub fn trigger_source_from_str(trigger_source: &str) -> Option<TriggerSource> {
    match trigger_source {
        "slack" => Some(TriggerSource::Slack),
        "github_pr" => Some(TriggerSource::GitHubPr),
        "github_issue" => Some(TriggerSource::GitHubIssue),
        "pagerduty" => Some(TriggerSource::PagerDuty),
        "incidentio" => Some(TriggerSource::IncidentIo),
        _ => None,
    }
}

/// Mints a short-lived impersonation token scoped to `node_id`, for an
/// internal caller (webhook intake, the scheduler) that already trusts
/// `node_id` from its own resolution path (the routing map, a job row)
/// and needs a `team_token` to hand [`run_agent`] so dispatch goes
/// through the same principal resolution an externally-presented token
/// would.
pub fn mint_team_token(state: &AppState, node_id: Uuid) -> Result<String, OrchestratorError> {
    let (token, _jti) = mint_impersonation_token(&state.settings.impersonation_jwt_secret, node_id, IMPERSONATION_MAX_TTL_SECONDS)?;
    Ok(token)
}

/// Dispatches one agent run on behalf of whatever node `team_token`
/// resolves to: classifies the token into a [`incidentfox_domain::Principal`],
/// mints a sandbox JWT scoped to the run, hands it to
/// [`incidentfox_agent_client::AgentRuntimeClient::run_agent`], and keeps
/// `RunRepository` current as the run moves through its lifecycle.
/// `on_event` is forwarded every event in produce order so a caller
/// streaming back to a webhook source (or fanning out to destinations as
/// results arrive) doesn't have to wait for the terminal event.
/// `output_destinations` is the caller's explicit destination override,
/// if any — threaded back out on [`DispatchOutcome`] so the caller can
/// hand it to [`crate::fanout::post_result`] unchanged.
#[allow(clippy::too_many_arguments)]
pub async fn run_agent(
    state: &AppState,
    team_token: &str,
    agent_name: &str,
    message: &str,
    context: &Value,
    max_turns: u32,
    correlation_id: &str,
    output_destinations: Vec<Destination>,
    trigger_source: &str,
    mut on_event: impl FnMut(&AgentEvent),
) -> Result<DispatchOutcome, OrchestratorError> {
    let principal = auth::classify(team_token, state)?;
    let node_id = principal.node_id.ok_or(OrchestratorError::PermissionDenied)?;

    let run_id = Uuid::new_v4();
    let connection = state.db.connection()?;
    let runs = RunRepository::new(connection);
    let audit = AuditRepository::new(state.db.connection()?);

    runs.create_agent_run(run_id, node_id, trigger_source).await?;
    audit
        .record(
            Uuid::new_v4(),
            Some(node_id),
            Some(run_id),
            "orchestrator",
            "agent_run.dispatched",
            &json!({ "agent_name": agent_name, "correlation_id": correlation_id }),
        )
        .await?;

    let sandbox_jwt = mint_sandbox_token(&state.settings.sandbox_jwt_secret, node_id, run_id, incidentfox_crypto::SANDBOX_MAX_TTL_SECONDS)?;

    let outcome = state
        .agent_client
        .run_agent(&sandbox_jwt, agent_name, message, context, max_turns, correlation_id, |event| on_event(event))
        .await;

    match outcome {
        Ok(outcome) => {
            let status = if outcome.success { incidentfox_domain::AgentRunStatus::Completed } else { incidentfox_domain::AgentRunStatus::Failed };
            runs.set_status(run_id, status).await?;
            audit
                .record(
                    Uuid::new_v4(),
                    Some(node_id),
                    Some(run_id),
                    "orchestrator",
                    "agent_run.completed",
                    &json!({ "success": outcome.success, "events_count": outcome.events_count }),
                )
                .await?;
            info!(%run_id, success = outcome.success, "agent run finished");
            Ok(DispatchOutcome { run_id, node_id, success: outcome.success, result_text: outcome.result_text, output_destinations })
        }
        Err(e) => {
            runs.set_status(run_id, incidentfox_domain::AgentRunStatus::Failed).await?;
            audit
                .record(Uuid::new_v4(), Some(node_id), Some(run_id), "orchestrator", "agent_run.failed", &json!({ "error": e.to_string() }))
                .await?;
            warn!(%run_id, error = %e, "agent run failed");
            Err(OrchestratorError::Agent(e))
        }
    }
}

pub async fn record_sandbox_id(state: &AppState, run_id: Uuid, sandbox_id: &str) -> Result<(), OrchestratorError> {
    let runs = RunRepository::new(state.db.connection()?);
    runs.set_sandbox_id(run_id, sandbox_id).await?;
    Ok(())
}

pub async fn record_github_comment_marker(state: &AppState, run_id: Uuid, marker: &str) -> Result<(), OrchestratorError> {
    let runs = RunRepository::new(state.db.connection()?);
    runs.set_github_comment_marker(run_id, marker).await?;
    Ok(())
}
