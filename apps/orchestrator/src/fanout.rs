// [apps/orchestrator/src/fanout.rs]
use crate::errors::OrchestratorError;
use crate::feedback;
use crate::state::AppState;
use incidentfox_crypto::{decrypt_dict, EncryptionKey};
use incidentfox_db::{AuditRepository, NodeRepository};
use incidentfox_domain::{resolve_destinations, Destination, OutputConfig, TriggerSource};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

/// One destination's posting outcome, kept independent of the others so
/// a failed Slack post doesn't stop the GitHub comment from going out.
pub struct FanoutResult {
    pub destination: Destination,
    pub success: bool,
    pub error: Option<String>,
}

/// Resolves where `run_id`'s result should land given its trigger and
/// posts to every destination, in parallel failure-isolation but in
/// series for simplicity — each destination's own error is captured
/// rather than propagated, and the whole batch always returns `Ok`.
pub async fn post_result(
    state: &AppState,
    node_id: Uuid,
    run_id: Uuid,
    source: TriggerSource,
    trigger_thread: Option<Destination>,
    explicit_override: Option<Vec<Destination>>,
    result_text: &str,
    success: bool,
) -> Result<Vec<FanoutResult>, OrchestratorError> {
    let output_config = load_output_config(state, node_id).await?;
    let destinations = resolve_destinations(&output_config, source, trigger_thread, explicit_override);

    let mut results = Vec::with_capacity(destinations.len());
    for destination in destinations {
        let outcome = post_to_destination(state, node_id, run_id, &destination, result_text, success).await;
        let (ok, error) = match outcome {
            Ok(()) => (true, None),
            Err(e) => {
                warn!(%run_id, destination = ?destination, error = %e, "fan-out to destination failed");
                (false, Some(e.to_string()))
            }
        };

        let audit = AuditRepository::new(state.db.connection()?);
        audit
            .record(
                Uuid::new_v4(),
                Some(node_id),
                Some(run_id),
                "orchestrator",
                "fanout.posted",
                &json!({ "destination": destination, "success": ok, "error": error }),
            )
            .await?;

        results.push(FanoutResult { destination, success: ok, error });
    }
    Ok(results)
}

async fn load_output_config(state: &AppState, node_id: Uuid) -> Result<OutputConfig, OrchestratorError> {
    let nodes = NodeRepository::new(state.db.connection()?);
    let effective = nodes.get_effective_config(node_id).await?;
    let key = EncryptionKey::from_base64(&state.settings.encryption_key)?;
    let decrypted = decrypt_dict(&key, &effective.data)?;
    let config = decrypted.get("output_config").cloned().unwrap_or(Value::Null);
    Ok(serde_json::from_value(config).unwrap_or_default())
}

async fn integration_config(state: &AppState, node_id: Uuid, integration_id: &str) -> Result<Option<Value>, OrchestratorError> {
    let nodes = NodeRepository::new(state.db.connection()?);
    let effective = nodes.get_effective_config(node_id).await?;
    let key = EncryptionKey::from_base64(&state.settings.encryption_key)?;
    let decrypted = decrypt_dict(&key, &effective.data)?;
    Ok(decrypted.get("integrations").and_then(|i| i.get(integration_id)).cloned())
}

async fn post_to_destination(
    state: &AppState,
    node_id: Uuid,
    run_id: Uuid,
    destination: &Destination,
    result_text: &str,
    success: bool,
) -> Result<(), OrchestratorError> {
    match destination {
        Destination::SlackChannel { channel_id } => post_slack_message(state, node_id, channel_id, result_text).await,
        Destination::GitHubThread { owner, repo, number } => post_github_comment(state, node_id, run_id, owner, repo, *number, result_text, success).await,
        Destination::WebhookUrl { url } => post_webhook(state, url, run_id, result_text, success).await,
    }
}

async fn post_slack_message(state: &AppState, node_id: Uuid, channel_id: &str, text: &str) -> Result<(), OrchestratorError> {
    let Some(config) = integration_config(state, node_id, "slack").await? else {
        return Err(OrchestratorError::UnknownProvider);
    };
    let bot_token = config.get("bot_token").and_then(Value::as_str).unwrap_or_default();

    let response = state
        .http
        .post("https://slack.com/api/chat.postMessage")
        .bearer_auth(bot_token)
        .json(&json!({ "channel": channel_id, "text": text }))
        .send()
        .await?;

    let body: Value = response.json().await.unwrap_or(Value::Null);
    if body.get("ok").and_then(Value::as_bool) != Some(true) {
        let error = body.get("error").and_then(Value::as_str).unwrap_or("slack_post_failed").to_string();
        return Err(OrchestratorError::FanoutFailed(error));
    }
    Ok(())
}

async fn post_github_comment(
    state: &AppState,
    node_id: Uuid,
    run_id: Uuid,
    owner: &str,
    repo: &str,
    number: u64,
    result_text: &str,
    success: bool,
) -> Result<(), OrchestratorError> {
    let Some(config) = integration_config(state, node_id, "github").await? else {
        return Err(OrchestratorError::UnknownProvider);
    };
    let installation_token = config.get("installation_token").and_then(Value::as_str).unwrap_or_default();

    let status_line = if success { "Done." } else { "This run did not complete successfully." };
    let body = format!("{status_line}\n\n{result_text}\n\n{}", feedback::run_id_marker(run_id));

    let url = format!("https://api.github.com/repos/{owner}/{repo}/issues/{number}/comments");
    let response = state
        .http
        .post(&url)
        .bearer_auth(installation_token)
        .header("Accept", "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28")
        .json(&json!({ "body": body }))
        .send()
        .await?;

    if !response.status().is_success() {
        warn!(%run_id, owner, repo, number, status = %response.status(), "github comment post returned a non-success status");
        return Ok(());
    }

    if let Ok(created) = response.json::<Value>().await {
        if let Some(comment_id) = created.get("id").and_then(Value::as_u64) {
            let marker = format!("{owner}/{repo}#{comment_id}");
            crate::dispatcher::record_github_comment_marker(state, run_id, &marker).await?;
        }
    }
    Ok(())
}

async fn post_webhook(state: &AppState, url: &str, run_id: Uuid, result_text: &str, success: bool) -> Result<(), OrchestratorError> {
    state
        .http
        .post(url)
        .json(&json!({ "run_id": run_id, "success": success, "result": result_text }))
        .send()
        .await?;
    Ok(())
}
