// [libs/infra/agent-client/src/client.rs]
use crate::errors::AgentClientError;
use crate::events::{AgentEvent, AgentEventType};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{instrument, warn};

#[derive(Serialize)]
struct RunAgentRequest<'a> {
    agent_name: &'a str,
    message: &'a str,
    context: &'a Value,
    max_turns: u32,
    correlation_id: &'a str,
}

/// Result of a single agent dispatch, after the stream has been drained
/// to its terminal event.
pub struct AgentRunOutcome {
    pub success: bool,
    pub events_count: u32,
    pub result_text: Option<String>,
}

pub struct AgentRuntimeClient {
    http: Client,
    base_url: String,
}

impl AgentRuntimeClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::builder()
                .connect_timeout(Duration::from_secs(30))
                .build()
                .expect("agent runtime client must build"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Dispatches a run and drains its event stream until a terminal
    /// event (`result` or `error`) or `max_turns` is exceeded. `on_event`
    /// is invoked once per event in produce order, before the terminal
    /// check, so callers can fan events out to their own consumers (an
    /// SSE bridge, an audit writer) as they arrive.
    #[instrument(skip(self, context, sandbox_jwt, on_event))]
    pub async fn run_agent(
        &self,
        sandbox_jwt: &str,
        agent_name: &str,
        message: &str,
        context: &Value,
        max_turns: u32,
        correlation_id: &str,
        mut on_event: impl FnMut(&AgentEvent),
    ) -> Result<AgentRunOutcome, AgentClientError> {
        let response = self
            .http
            .post(format!("{}/v1/agents/run", self.base_url))
            .bearer_auth(sandbox_jwt)
            .json(&RunAgentRequest { agent_name, message, context, max_turns, correlation_id })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(AgentClientError::ServerRejection(format!("HTTP {}", response.status())));
        }

        let mut byte_stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut events_count = 0u32;
        let mut success = false;
        let mut result_text = None;

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim_end_matches('\r').to_string();
                buffer.drain(..=newline);

                let Some(payload) = line.strip_prefix("data:") else { continue };
                let payload = payload.trim();
                if payload.is_empty() {
                    continue;
                }

                let event: AgentEvent = serde_json::from_str(payload)?;
                events_count += 1;
                on_event(&event);

                if event.event_type.is_terminal() {
                    success = event.event_type == AgentEventType::Result;
                    result_text = event.data.get("text").and_then(Value::as_str).map(str::to_string);
                    return Ok(AgentRunOutcome { success, events_count, result_text });
                }
            }
        }

        warn!("agent stream for {correlation_id} closed without a terminal event");
        Ok(AgentRunOutcome { success, events_count, result_text })
    }
}
