// [apps/orchestrator/src/scheduler.rs]
use crate::dispatcher;
use crate::fanout;
use crate::feedback;
use crate::state::AppState;
use incidentfox_crypto::{decrypt_dict, EncryptionKey};
use incidentfox_db::{NodeRepository, RunRepository};
use incidentfox_domain::{ScheduledJob, ScheduledJobStatus};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const FEEDBACK_POLL_BATCH: u32 = 25;

/// Background daemon that drives both scheduled agent runs and GitHub
/// feedback polling. Lives for the process lifetime; `spawn` hands back
/// the `tokio` task so `main` can hold it and let it run to completion
/// on shutdown rather than abandoning it mid-tick.
pub struct Scheduler {
    state: AppState,
}

impl Scheduler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.state.settings.poll_interval_seconds));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = self.tick_due_jobs().await {
                warn!(error = %e, "scheduled job poll failed");
            }
            if let Err(e) = self.tick_feedback_poll().await {
                warn!(error = %e, "feedback poll failed");
            }
        }
    }

    async fn tick_due_jobs(&self) -> Result<(), reqwest::Error> {
        let url = format!(
            "{}/api/v1/internal/scheduled-jobs/due",
            self.state.settings.config_service_base_url.trim_end_matches('/')
        );
        let jobs: Vec<ScheduledJob> = self
            .state
            .http
            .get(&url)
            .query(&[("claimant", self.state.settings.internal_service_id.as_str()), ("limit", "20")])
            .send()
            .await?
            .json()
            .await?;

        for job in jobs {
            let state = self.state.clone();
            tokio::spawn(async move { run_job(&state, job).await });
        }
        Ok(())
    }

    async fn tick_feedback_poll(&self) -> Result<(), incidentfox_db::DbError> {
        let runs = RunRepository::new(self.state.db.connection()?).list_pending_feedback_checks(FEEDBACK_POLL_BATCH).await?;
        for run in runs {
            let Some(marker) = run.github_comment_marker.clone() else { continue };
            let Some((repo_full_name, comment_id)) = split_comment_marker(&marker) else { continue };
            let state = self.state.clone();
            tokio::spawn(async move {
                match github_installation_token(&state, run.node_id).await {
                    Ok(Some(token)) => feedback::poll_github_reactions(&state, run.id, &repo_full_name, comment_id, &token).await,
                    Ok(None) => warn!(run_id = %run.id, "no github integration configured for feedback poll"),
                    Err(e) => warn!(run_id = %run.id, error = %e, "could not resolve github token for feedback poll"),
                }
            });
        }
        Ok(())
    }
}

fn split_comment_marker(marker: &str) -> Option<(String, u64)> {
    let (repo, comment_id) = marker.rsplit_once('#')?;
    Some((repo.to_string(), comment_id.parse().ok()?))
}

async fn github_installation_token(state: &AppState, node_id: Uuid) -> Result<Option<String>, incidentfox_db::DbError> {
    let nodes = NodeRepository::new(state.db.connection()?);
    let effective = nodes.get_effective_config(node_id).await?;
    let key = EncryptionKey::from_base64(&state.settings.encryption_key).map_err(|e| incidentfox_db::DbError::Mapping(e.to_string()))?;
    let decrypted = decrypt_dict(&key, &effective.data).map_err(|e| incidentfox_db::DbError::Mapping(e.to_string()))?;
    Ok(decrypted
        .get("integrations")
        .and_then(|i| i.get("github"))
        .and_then(|c| c.get("installation_token"))
        .and_then(Value::as_str)
        .map(str::to_string))
}

#[derive(Debug, Deserialize)]
struct ScheduledJobPayload {
    agent_name: String,
    message: String,
    #[serde(default)]
    context: Value,
}

async fn run_job(state: &AppState, job: ScheduledJob) {
    let payload: ScheduledJobPayload = match serde_json::from_value(job.payload.clone()) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(job_id = %job.id, error = %e, "scheduled job payload did not match the expected shape");
            complete_job(state, job.id, ScheduledJobStatus::Failed, Some(json!({ "error": e.to_string() }))).await;
            return;
        }
    };

    let team_token = match dispatcher::mint_team_token(state, job.node_id) {
        Ok(token) => token,
        Err(e) => {
            warn!(job_id = %job.id, error = %e, "could not mint a team token for scheduled dispatch");
            complete_job(state, job.id, ScheduledJobStatus::Failed, Some(json!({ "error": e.to_string() }))).await;
            return;
        }
    };

    let outcome = dispatcher::run_agent(
        state,
        &team_token,
        &payload.agent_name,
        &payload.message,
        &payload.context,
        dispatcher::DEFAULT_MAX_TURNS,
        &job.id.to_string(),
        Vec::new(),
        "scheduled",
        |_event| {},
    )
    .await;

    match outcome {
        Ok(outcome) => {
            info!(job_id = %job.id, run_id = %outcome.run_id, success = outcome.success, "scheduled job dispatched");
            let status = if outcome.success { ScheduledJobStatus::Completed } else { ScheduledJobStatus::Failed };
            if let Some(source) = dispatcher::trigger_source_from_str("scheduled") {
                let result_text = outcome.result_text.as_deref().unwrap_or_default();
                if let Err(e) = fanout::post_result(state, outcome.node_id, outcome.run_id, source, None, None, result_text, outcome.success).await {
                    warn!(job_id = %job.id, run_id = %outcome.run_id, error = %e, "result fan-out failed");
                }
            }
            complete_job(state, job.id, status, Some(json!({ "run_id": outcome.run_id }))).await;
        }
        Err(e) => {
            warn!(job_id = %job.id, error = %e, "scheduled job dispatch failed");
            complete_job(state, job.id, ScheduledJobStatus::Failed, Some(json!({ "error": e.to_string() }))).await;
        }
    }
}

async fn complete_job(state: &AppState, job_id: Uuid, status: ScheduledJobStatus, result: Option<Value>) {
    let url = format!(
        "{}/api/v1/internal/scheduled-jobs/{job_id}/complete",
        state.settings.config_service_base_url.trim_end_matches('/')
    );
    if let Err(e) = state.http.post(&url).json(&json!({ "status": status, "result": result })).send().await {
        warn!(%job_id, error = %e, "failed to report scheduled job completion");
    }
}
