// [libs/infra/agent-client/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentClientError {
    #[error("network error reaching agent runtime: {0}")]
    NetworkFault(#[from] reqwest::Error),

    #[error("malformed event envelope: {0}")]
    DecodingFault(#[from] serde_json::Error),

    #[error("agent runtime rejected the request: {0}")]
    ServerRejection(String),

    #[error("sandbox unavailable after retries")]
    SandboxUnavailable,

    #[error("sandbox namespace contains characters other than alphanumerics and hyphens")]
    InvalidNamespace,

    #[error("agent run exceeded max_turns before a terminal event")]
    MaxTurnsExceeded,
}
