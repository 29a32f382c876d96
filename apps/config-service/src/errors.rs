// [apps/config-service/src/errors.rs]
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use incidentfox_db::DbError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("missing_token")]
    MissingToken,
    #[error("invalid_token")]
    InvalidToken,
    #[error("expired")]
    Expired,
    #[error("insufficient_permission")]
    InsufficientPermission,
    #[error("immutable_field: {0}")]
    ImmutableField(String),
    #[error("not_found")]
    NotFound,
    #[error("invalid_parent")]
    InvalidParent,
    #[error("conflict: {reason}")]
    Conflict { reason: &'static str, provisioning_run_id: Option<Uuid> },
    #[error("integration_not_configured")]
    IntegrationNotConfigured { integration_id: String, missing_fields: Vec<String> },
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Domain(#[from] incidentfox_domain::DomainError),
    #[error(transparent)]
    Crypto(#[from] incidentfox_crypto::CryptoError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason, extra) = match &self {
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token", json!({})),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", json!({})),
            ApiError::Expired => (StatusCode::UNAUTHORIZED, "expired", json!({})),
            ApiError::InsufficientPermission => (StatusCode::FORBIDDEN, "insufficient_permission", json!({})),
            ApiError::ImmutableField(field) => (StatusCode::BAD_REQUEST, "immutable_field", json!({ "field": field })),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not_found", json!({})),
            ApiError::InvalidParent => (StatusCode::BAD_REQUEST, "invalid_parent", json!({})),
            ApiError::Conflict { reason, .. } => (StatusCode::CONFLICT, *reason, json!({})),
            ApiError::IntegrationNotConfigured { integration_id, missing_fields } => (
                StatusCode::FAILED_DEPENDENCY,
                "integration_not_configured",
                json!({ "integration_id": integration_id, "missing_fields": missing_fields }),
            ),
            ApiError::Db(DbError::RoutingConflict { .. }) => (StatusCode::CONFLICT, "slack_channel_already_mapped", json!({})),
            ApiError::Db(DbError::NodeNotFound) | ApiError::Db(DbError::TokenNotFound) => (StatusCode::NOT_FOUND, "not_found", json!({})),
            ApiError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", json!({})),
            ApiError::Domain(_) => (StatusCode::BAD_REQUEST, "schema_violation", json!({})),
            ApiError::Crypto(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", json!({})),
        };

        let mut body = json!({ "error": reason });
        if let serde_json::Value::Object(extra_map) = extra {
            if let serde_json::Value::Object(body_map) = &mut body {
                body_map.extend(extra_map);
            }
        }

        let mut response = (status, Json(body)).into_response();
        if let ApiError::Conflict { provisioning_run_id: Some(run_id), .. } = &self {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-provisioning-run-id"), run_id.to_string().parse().unwrap());
        }
        response
    }
}
