// [apps/orchestrator/src/errors.rs]
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Signature(#[from] crate::webhooks::signature::SignatureError),
    #[error("slack_channel_already_mapped")]
    SlackChannelAlreadyMapped,
    #[error("permission_denied")]
    PermissionDenied,
    #[error("unmapped_external_key")]
    UnmappedExternalKey,
    #[error("unknown_provider")]
    UnknownProvider,
    #[error("fanout_failed: {0}")]
    FanoutFailed(String),
    #[error(transparent)]
    Db(#[from] incidentfox_db::DbError),
    #[error(transparent)]
    Crypto(#[from] incidentfox_crypto::CryptoError),
    #[error(transparent)]
    Agent(#[from] incidentfox_agent_client::AgentClientError),
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for OrchestratorError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self {
            OrchestratorError::Signature(e) => (StatusCode::UNAUTHORIZED, e.reason()),
            OrchestratorError::SlackChannelAlreadyMapped => (StatusCode::CONFLICT, "slack_channel_already_mapped"),
            OrchestratorError::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied"),
            OrchestratorError::UnmappedExternalKey => (StatusCode::ACCEPTED, "unmapped_external_key"),
            OrchestratorError::UnknownProvider => (StatusCode::BAD_REQUEST, "unknown_provider"),
            OrchestratorError::FanoutFailed(_) => (StatusCode::BAD_GATEWAY, "fanout_failed"),
            OrchestratorError::Db(incidentfox_db::DbError::RoutingConflict { .. }) => {
                (StatusCode::CONFLICT, "slack_channel_already_mapped")
            }
            OrchestratorError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            OrchestratorError::Crypto(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            OrchestratorError::Agent(_) => (StatusCode::BAD_GATEWAY, "agent_runtime_unreachable"),
            OrchestratorError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_unreachable"),
        };
        (status, Json(json!({ "error": reason }))).into_response()
    }
}
