// [apps/credential-proxy/src/auth.rs]
use crate::errors::ProxyError;
use axum::http::HeaderMap;
use incidentfox_crypto::{verify_sandbox_token, SandboxClaims};

/// Pulls the sandbox JWT out of `X-Sandbox-JWT` and verifies it. This is
/// the proxy's only form of inbound auth — there is no session, no
/// admin token, nothing else a sandbox can present.
pub fn verify_sandbox_request(headers: &HeaderMap, sandbox_jwt_secret: &str) -> Result<SandboxClaims, ProxyError> {
    let token = headers.get("x-sandbox-jwt").and_then(|v| v.to_str().ok()).ok_or(ProxyError::MissingSandboxJwt)?;
    verify_sandbox_token(sandbox_jwt_secret, token).map_err(|_| ProxyError::InvalidSandboxJwt)
}
