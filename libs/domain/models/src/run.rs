// [libs/domain/models/src/run.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStatus {
    Pending,
    Completed,
    Failed,
}

/// One attempt to auto-provision a team node from a webhook event,
/// deduplicated on `(org_id, team_node_id, idempotency_key)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningRun {
    pub id: Uuid,
    pub org_id: Uuid,
    pub team_node_id: Option<Uuid>,
    pub idempotency_key: String,
    pub status: ProvisioningStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledJobStatus {
    Pending,
    Claimed,
    Completed,
    Failed,
}

/// A due job in the scheduler's queue. `claimed_at`/`claimed_by` are set
/// atomically by the dequeue operation so two scheduler processes can
/// never both run the same job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: Uuid,
    pub node_id: Uuid,
    pub job_type: String,
    pub payload: Value,
    pub run_at: DateTime<Utc>,
    pub status: ScheduledJobStatus,
    pub claimed_at: Option<DateTime<Utc>>,
    pub claimed_by: Option<String>,
    pub result: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRunStatus {
    Dispatched,
    Streaming,
    Completed,
    Failed,
}

/// A single invocation of the external agent runtime, tracked end to end
/// from dispatch through its streamed events to final result fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    pub id: Uuid,
    pub node_id: Uuid,
    pub trigger_source: String,
    pub status: AgentRunStatus,
    pub sandbox_id: Option<String>,
    pub github_comment_marker: Option<String>,
    pub feedback: Option<FeedbackSignal>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSignal {
    Positive,
    Negative,
}

/// A unit of A2A (agent-to-agent) protocol work delegated from one agent
/// run to another, persisted so the dispatcher can track completion
/// across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct A2ATask {
    pub id: Uuid,
    pub parent_run_id: Uuid,
    pub target_agent: String,
    pub payload: Value,
    pub status: AgentRunStatus,
    pub created_at: DateTime<Utc>,
}
