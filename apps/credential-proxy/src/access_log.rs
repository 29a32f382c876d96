// [apps/credential-proxy/src/access_log.rs]
use uuid::Uuid;

/// One structured line per proxied call. This is the only audit trail a
/// credential call gets — the proxy never stores request or response
/// bodies, only this envelope.
pub struct AccessEvent<'a> {
    pub node_id: Uuid,
    pub run_id: Uuid,
    pub integration_id: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub upstream_status: Option<u16>,
    pub bytes_out: u64,
    pub duration_ms: u128,
}

pub fn record(event: AccessEvent<'_>) {
    tracing::info!(
        node_id = %event.node_id,
        run_id = %event.run_id,
        integration_id = event.integration_id,
        method = event.method,
        path = event.path,
        upstream_status = event.upstream_status,
        bytes_out = event.bytes_out,
        duration_ms = event.duration_ms as u64,
        "credential_proxy_access"
    );
}
