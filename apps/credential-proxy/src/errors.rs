// [apps/credential-proxy/src/errors.rs]
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("missing_sandbox_jwt")]
    MissingSandboxJwt,
    #[error("invalid_sandbox_jwt")]
    InvalidSandboxJwt,
    #[error("unknown_provider: {0}")]
    UnknownProvider(String),
    #[error("integration_not_configured")]
    IntegrationNotConfigured { integration_id: String, missing_fields: Vec<String> },
    #[error(transparent)]
    Db(#[from] incidentfox_db::DbError),
    #[error(transparent)]
    Crypto(#[from] incidentfox_crypto::CryptoError),
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, reason, extra) = match &self {
            ProxyError::MissingSandboxJwt => (StatusCode::UNAUTHORIZED, "missing_sandbox_jwt", json!({})),
            ProxyError::InvalidSandboxJwt => (StatusCode::UNAUTHORIZED, "invalid_sandbox_jwt", json!({})),
            ProxyError::UnknownProvider(provider) => (StatusCode::NOT_FOUND, "unknown_provider", json!({ "provider": provider })),
            ProxyError::IntegrationNotConfigured { integration_id, missing_fields } => (
                StatusCode::FAILED_DEPENDENCY,
                "integration_not_configured",
                json!({ "integration_id": integration_id, "missing_fields": missing_fields }),
            ),
            ProxyError::Db(incidentfox_db::DbError::NodeNotFound) => (StatusCode::UNAUTHORIZED, "invalid_sandbox_jwt", json!({})),
            ProxyError::Db(_) => (StatusCode::BAD_GATEWAY, "internal_error", json!({})),
            ProxyError::Crypto(_) => (StatusCode::BAD_GATEWAY, "internal_error", json!({})),
            ProxyError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_unreachable", json!({})),
        };

        let mut body = json!({ "error": reason });
        if let serde_json::Value::Object(extra_map) = extra {
            if let serde_json::Value::Object(body_map) = &mut body {
                body_map.extend(extra_map);
            }
        }
        (status, Json(body)).into_response()
    }
}
