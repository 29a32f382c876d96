// [apps/credential-proxy/src/handlers.rs]
use crate::access_log::{self, AccessEvent};
use crate::auth::verify_sandbox_request;
use crate::errors::ProxyError;
use crate::providers::{self, llm};
use crate::sse::translate_openai_sse;
use crate::state::AppState;
use crate::{credentials, providers::ProviderSpec};
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use std::time::Instant;

/// Inbound headers that either don't make sense to forward upstream, or
/// would leak tenancy details the sandbox is not meant to hand an
/// external vendor directly.
const STRIPPED_INBOUND_HEADERS: &[&str] =
    &["host", "authorization", "x-sandbox-jwt", "content-length", "connection", "x-tenant-id", "x-team-id", "x-org-id"];

/// Response headers that don't transfer across a hop — reused verbatim
/// for both the generic proxy and the LLM passthrough path.
const STRIPPED_UPSTREAM_HEADERS: &[&str] =
    &["connection", "transfer-encoding", "content-length", "content-encoding", "keep-alive"];

/// `ANY /:provider/*rest` — forwards a sandboxed agent's call to the
/// named provider's native API, injecting the team's stored credential
/// and stripping anything that would leak the sandbox's internal
/// identity to the vendor.
pub async fn proxy(
    State(state): State<AppState>,
    Path((provider, rest)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let claims = verify_sandbox_request(&headers, &state.settings.sandbox_jwt_secret)?;
    let spec = providers::find(&provider).ok_or_else(|| ProxyError::UnknownProvider(provider.clone()))?;
    let config = credentials::resolve(&state.db, claims.sub, spec, &state.settings.encryption_key).await?;

    let target = format!("{}/{}", providers::base_url(spec, &config), rest.trim_start_matches('/'));
    let started = Instant::now();

    let mut outbound = state.upstream.request(method.clone(), &target);
    for (name, value) in headers.iter() {
        if STRIPPED_INBOUND_HEADERS.contains(&name.as_str()) {
            continue;
        }
        outbound = outbound.header(name, value);
    }
    outbound = providers::apply_auth(spec, &config, outbound);

    let upstream_response = outbound.body(body).send().await?;
    let status = upstream_response.status();
    let mut response_headers = upstream_response.headers().clone();
    for stripped in STRIPPED_UPSTREAM_HEADERS {
        response_headers.remove(*stripped);
    }

    let bytes = upstream_response.bytes().await?;
    access_log::record(AccessEvent {
        node_id: claims.sub,
        run_id: claims.run_id,
        integration_id: spec.integration_id,
        method: method.as_str(),
        path: &rest,
        upstream_status: Some(status.as_u16()),
        bytes_out: bytes.len() as u64,
        duration_ms: started.elapsed().as_millis(),
    });

    let mut response = Response::builder().status(status);
    for (name, value) in response_headers.iter() {
        response = response.header(name, value);
    }
    Ok(response.body(Body::from(bytes)).expect("response built from well-formed upstream headers"))
}

/// `POST /v1/messages` — the sandbox's one entry point for LLM calls. A
/// `claude/...` model passes through untouched; everything else is
/// translated to and from the OpenAI chat-completions shape, which is
/// close enough to serve as the one concrete non-Anthropic translation.
pub async fn messages(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<Response, ProxyError> {
    let claims = verify_sandbox_request(&headers, &state.settings.sandbox_jwt_secret)?;

    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let model = headers
        .get("x-llm-model")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.get("model").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();

    let spec = providers::find_for_model(&model).ok_or_else(|| ProxyError::UnknownProvider(model.clone()))?;
    let config = credentials::resolve(&state.db, claims.sub, spec, &state.settings.encryption_key).await?;
    let streaming = request.get("stream").and_then(Value::as_bool).unwrap_or(false);
    let started = Instant::now();

    let response = if spec.path_prefix == "claude" {
        send_passthrough(&state, spec, &config, &format!("{}/v1/messages", providers::base_url(spec, &config)), &body).await?
    } else {
        let translated = llm::anthropic_to_openai_request(&request);
        let target = format!("{}/v1/chat/completions", providers::base_url(spec, &config));
        send_translated(&state, spec, &config, &target, &translated, streaming).await?
    };

    access_log::record(AccessEvent {
        node_id: claims.sub,
        run_id: claims.run_id,
        integration_id: spec.integration_id,
        method: "POST",
        path: "/v1/messages",
        upstream_status: Some(response.status().as_u16()),
        bytes_out: 0,
        duration_ms: started.elapsed().as_millis(),
    });

    Ok(response)
}

async fn send_passthrough(
    state: &AppState,
    spec: &ProviderSpec,
    config: &Value,
    target: &str,
    body: &Bytes,
) -> Result<Response, ProxyError> {
    let outbound = providers::apply_auth(spec, config, state.upstream.post(target).header("content-type", "application/json"));
    let upstream_response = outbound.body(body.clone()).send().await?;
    relay(upstream_response).await
}

async fn send_translated(
    state: &AppState,
    spec: &ProviderSpec,
    config: &Value,
    target: &str,
    translated_body: &Value,
    streaming: bool,
) -> Result<Response, ProxyError> {
    let outbound = providers::apply_auth(spec, config, state.upstream.post(target).json(translated_body));
    let upstream_response = outbound.send().await?;
    let status = upstream_response.status();

    if !streaming || !status.is_success() {
        let openai_body: Value = upstream_response.json().await.unwrap_or(Value::Null);
        let anthropic_body = llm::openai_to_anthropic_response(&openai_body);
        return Ok((status, Json(anthropic_body)).into_response());
    }

    let translated_stream = translate_openai_sse(upstream_response.bytes_stream());
    let response = Response::builder()
        .status(status)
        .header("content-type", "text/event-stream")
        .body(Body::from_stream(translated_stream))
        .expect("response built from well-formed status and static headers");
    Ok(response)
}

async fn relay(upstream_response: reqwest::Response) -> Result<Response, ProxyError> {
    let status = upstream_response.status();
    let mut headers = upstream_response.headers().clone();
    for stripped in STRIPPED_UPSTREAM_HEADERS {
        headers.remove(*stripped);
    }
    let bytes = upstream_response.bytes().await?;

    let mut response = Response::builder().status(status);
    for (name, value) in headers.iter() {
        response = response.header(name, value);
    }
    Ok(response.body(Body::from(bytes)).expect("response built from well-formed upstream headers"))
}
