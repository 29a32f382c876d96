// [libs/infra/db/src/repositories/run.rs]
use crate::errors::DbError;
use crate::repositories::node::{parse_timestamp, parse_uuid};
use incidentfox_domain::{A2ATask, AgentRun, AgentRunStatus, FeedbackSignal};
use libsql::{params, Connection};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

pub struct RunRepository {
    connection: Connection,
}

impl RunRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self))]
    pub async fn create_agent_run(&self, id: Uuid, node_id: Uuid, trigger_source: &str) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO agent_runs (id, node_id, trigger_source, status) VALUES (?1, ?2, ?3, 'dispatched')",
                params![id.to_string(), node_id.to_string(), trigger_source.to_string()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: Uuid, status: AgentRunStatus) -> Result<(), DbError> {
        let completed_clause = matches!(status, AgentRunStatus::Completed | AgentRunStatus::Failed)
            .then_some(", completed_at = CURRENT_TIMESTAMP")
            .unwrap_or_default();
        self.connection
            .execute(
                &format!("UPDATE agent_runs SET status = ?2{completed_clause} WHERE id = ?1"),
                params![id.to_string(), agent_status_to_str(status).to_string()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_sandbox_id(&self, id: Uuid, sandbox_id: &str) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE agent_runs SET sandbox_id = ?2 WHERE id = ?1",
                params![id.to_string(), sandbox_id.to_string()],
            )
            .await?;
        Ok(())
    }

    /// Records the hidden marker embedded in the GitHub comment this run
    /// posted, so a later reaction webhook can be matched back to it.
    #[instrument(skip(self))]
    pub async fn set_github_comment_marker(&self, id: Uuid, marker: &str) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE agent_runs SET github_comment_marker = ?2 WHERE id = ?1",
                params![id.to_string(), marker.to_string()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn record_feedback(&self, id: Uuid, feedback: FeedbackSignal) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE agent_runs SET feedback = ?2 WHERE id = ?1",
                params![id.to_string(), feedback_to_str(feedback).to_string()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_github_comment_marker(&self, marker: &str) -> Result<Option<AgentRun>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, node_id, trigger_source, status, sandbox_id, github_comment_marker, feedback, created_at, completed_at
                 FROM agent_runs WHERE github_comment_marker = ?1",
                params![marker.to_string()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_agent_run(row)?)),
            None => Ok(None),
        }
    }

    /// Runs that posted a marked GitHub comment but haven't had feedback
    /// recorded yet, most recent first. Backs the periodic reaction poll
    /// since GitHub doesn't deliver a webhook when a reaction is added.
    #[instrument(skip(self))]
    pub async fn list_pending_feedback_checks(&self, limit: u32) -> Result<Vec<AgentRun>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, node_id, trigger_source, status, sandbox_id, github_comment_marker, feedback, created_at, completed_at
                 FROM agent_runs
                 WHERE github_comment_marker IS NOT NULL AND feedback IS NULL
                 ORDER BY created_at DESC LIMIT ?1",
                params![limit as i64],
            )
            .await?;
        let mut runs = Vec::new();
        while let Some(row) = rows.next().await? {
            runs.push(map_agent_run(row)?);
        }
        Ok(runs)
    }

    #[instrument(skip(self))]
    pub async fn get_agent_run(&self, id: Uuid) -> Result<AgentRun, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, node_id, trigger_source, status, sandbox_id, github_comment_marker, feedback, created_at, completed_at
                 FROM agent_runs WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DbError::NodeNotFound)?;
        map_agent_run(row)
    }

    #[instrument(skip(self, payload))]
    pub async fn create_a2a_task(&self, id: Uuid, parent_run_id: Uuid, target_agent: &str, payload: &Value) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO a2a_tasks (id, parent_run_id, target_agent, payload, status) VALUES (?1, ?2, ?3, ?4, 'dispatched')",
                params![id.to_string(), parent_run_id.to_string(), target_agent.to_string(), payload.to_string()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_a2a_status(&self, id: Uuid, status: AgentRunStatus) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE a2a_tasks SET status = ?2 WHERE id = ?1",
                params![id.to_string(), agent_status_to_str(status).to_string()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_a2a_tasks_for_run(&self, parent_run_id: Uuid) -> Result<Vec<A2ATask>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, parent_run_id, target_agent, payload, status, created_at FROM a2a_tasks WHERE parent_run_id = ?1",
                params![parent_run_id.to_string()],
            )
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(map_a2a_task(row)?);
        }
        Ok(tasks)
    }
}

fn agent_status_to_str(status: AgentRunStatus) -> &'static str {
    match status {
        AgentRunStatus::Dispatched => "dispatched",
        AgentRunStatus::Streaming => "streaming",
        AgentRunStatus::Completed => "completed",
        AgentRunStatus::Failed => "failed",
    }
}

fn agent_status_from_str(raw: &str) -> Result<AgentRunStatus, DbError> {
    match raw {
        "dispatched" => Ok(AgentRunStatus::Dispatched),
        "streaming" => Ok(AgentRunStatus::Streaming),
        "completed" => Ok(AgentRunStatus::Completed),
        "failed" => Ok(AgentRunStatus::Failed),
        other => Err(DbError::Mapping(format!("unknown agent run status `{other}`"))),
    }
}

fn feedback_to_str(feedback: FeedbackSignal) -> &'static str {
    match feedback {
        FeedbackSignal::Positive => "positive",
        FeedbackSignal::Negative => "negative",
    }
}

fn feedback_from_str(raw: &str) -> Result<FeedbackSignal, DbError> {
    match raw {
        "positive" => Ok(FeedbackSignal::Positive),
        "negative" => Ok(FeedbackSignal::Negative),
        other => Err(DbError::Mapping(format!("unknown feedback signal `{other}`"))),
    }
}

fn map_agent_run(row: libsql::Row) -> Result<AgentRun, DbError> {
    let id: String = row.get(0)?;
    let node_id: String = row.get(1)?;
    let trigger_source: String = row.get(2)?;
    let status: String = row.get(3)?;
    let sandbox_id: Option<String> = row.get(4)?;
    let github_comment_marker: Option<String> = row.get(5)?;
    let feedback: Option<String> = row.get(6)?;
    let created_at: String = row.get(7)?;
    let completed_at: Option<String> = row.get(8)?;

    Ok(AgentRun {
        id: parse_uuid(&id)?,
        node_id: parse_uuid(&node_id)?,
        trigger_source,
        status: agent_status_from_str(&status)?,
        sandbox_id,
        github_comment_marker,
        feedback: feedback.map(|f| feedback_from_str(&f)).transpose()?,
        created_at: parse_timestamp(&created_at)?,
        completed_at: completed_at.map(|ts| parse_timestamp(&ts)).transpose()?,
    })
}

fn map_a2a_task(row: libsql::Row) -> Result<A2ATask, DbError> {
    let id: String = row.get(0)?;
    let parent_run_id: String = row.get(1)?;
    let target_agent: String = row.get(2)?;
    let payload: String = row.get(3)?;
    let status: String = row.get(4)?;
    let created_at: String = row.get(5)?;

    Ok(A2ATask {
        id: parse_uuid(&id)?,
        parent_run_id: parse_uuid(&parent_run_id)?,
        target_agent,
        payload: serde_json::from_str(&payload).map_err(|e| DbError::Mapping(e.to_string()))?,
        status: agent_status_from_str(&status)?,
        created_at: parse_timestamp(&created_at)?,
    })
}
