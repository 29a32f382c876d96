// [libs/infra/agent-client/src/events.rs]
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentEventType {
    Thought,
    ToolStart,
    ToolEnd,
    Result,
    Error,
    Approval,
    Question,
    QuestionTimeout,
}

impl AgentEventType {
    pub fn is_terminal(self) -> bool {
        matches!(self, AgentEventType::Result | AgentEventType::Error)
    }
}

/// One line of the agent runtime's `text/event-stream` — one JSON object
/// per `data:` line, delivered to consumers in produce order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    #[serde(rename = "type")]
    pub event_type: AgentEventType,
    pub data: Value,
    pub thread_id: String,
    pub timestamp: String,
}
