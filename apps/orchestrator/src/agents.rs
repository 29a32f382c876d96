// [apps/orchestrator/src/agents.rs]
use crate::dispatcher;
use crate::errors::OrchestratorError;
use crate::fanout;
use crate::state::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use incidentfox_domain::{Destination, Permission, Principal, TriggerSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RunAgentRequest {
    /// A token that resolves (via [`crate::auth::classify`]) to the team
    /// this run executes against — the caller hitting this admin route
    /// and the team the run executes for are distinct principals, same
    /// as the rest of C10's contract.
    pub team_token: String,
    pub agent_name: String,
    pub message: String,
    #[serde(default)]
    pub context: Value,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub output_destinations: Vec<Destination>,
    pub trigger_source: Option<String>,
}

fn default_max_turns() -> u32 {
    dispatcher::DEFAULT_MAX_TURNS
}

#[derive(Debug, Serialize)]
pub struct AgentRunResult {
    pub run_id: Uuid,
    pub success: bool,
    pub result: Option<String>,
    pub events_count: u32,
}

/// `POST /api/v1/admin/agents/run` — dispatches one agent run on demand,
/// outside any webhook or schedule. The only consumer-facing entrypoint
/// into C10 that doesn't come from C7 (webhook intake) or C9 (the
/// scheduler).
pub async fn run_agent(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<RunAgentRequest>,
) -> Result<Json<AgentRunResult>, OrchestratorError> {
    if !principal.has(Permission::AdminAgentRun) && !principal.has(Permission::AdminWildcard) {
        return Err(OrchestratorError::PermissionDenied);
    }

    let correlation_id = req.correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let trigger_source = req.trigger_source.unwrap_or_else(|| "admin".to_string());

    let mut events_count = 0u32;
    let outcome = dispatcher::run_agent(
        &state,
        &req.team_token,
        &req.agent_name,
        &req.message,
        &req.context,
        req.max_turns,
        &correlation_id,
        req.output_destinations.clone(),
        &trigger_source,
        |_event| events_count += 1,
    )
    .await?;

    if !outcome.output_destinations.is_empty() {
        // An explicit destination list short-circuits the resolver before
        // it ever looks at `source`, so an unrecognized trigger tag here
        // (e.g. the "admin" default) doesn't need its own TriggerSource.
        let source = dispatcher::trigger_source_from_str(&trigger_source).unwrap_or(TriggerSource::Slack);
        let result_text = outcome.result_text.as_deref().unwrap_or_default();
        let explicit_override = Some(outcome.output_destinations.clone());
        fanout::post_result(&state, outcome.node_id, outcome.run_id, source, None, explicit_override, result_text, outcome.success).await?;
    }

    Ok(Json(AgentRunResult { run_id: outcome.run_id, success: outcome.success, result: outcome.result_text, events_count }))
}
