// [libs/infra/agent-client/src/sandbox_router.rs]
use crate::errors::AgentClientError;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use tracing::{instrument, warn};

const MAX_CONNECT_ATTEMPTS: u32 = 8;
const BACKOFF_BASE_SECONDS: f64 = 1.0;
const BACKOFF_CAP_SECONDS: f64 = 4.0;

fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty() && namespace.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn connect_backoff(attempt: u32) -> Duration {
    let seconds = (BACKOFF_BASE_SECONDS * 2f64.powi(attempt as i32)).min(BACKOFF_CAP_SECONDS);
    Duration::from_secs_f64(seconds)
}

/// Proxies a request to `<sandbox_id>.<namespace>.svc.cluster.local:<port>`,
/// retrying only connect failures (never a response already received from
/// upstream) with capped exponential backoff.
pub struct SandboxRouterClient {
    http: Client,
}

impl SandboxRouterClient {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .connect_timeout(Duration::from_secs(30))
                .build()
                .expect("sandbox router client must build"),
        }
    }

    #[instrument(skip(self, body))]
    pub async fn proxy(
        &self,
        sandbox_id: &str,
        namespace: &str,
        port: u16,
        method: Method,
        path: &str,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, AgentClientError> {
        if !is_valid_namespace(namespace) {
            return Err(AgentClientError::InvalidNamespace);
        }

        let target = format!("http://{sandbox_id}.{namespace}.svc.cluster.local:{port}/{}", path.trim_start_matches('/'));

        for attempt in 0..MAX_CONNECT_ATTEMPTS {
            let request = self.http.request(method.clone(), &target).body(body.clone());
            match request.send().await {
                Ok(response) if response.status() != StatusCode::BAD_GATEWAY => return Ok(response),
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt + 1 < MAX_CONNECT_ATTEMPTS => {
                    warn!("sandbox router connect attempt {attempt} to {sandbox_id} failed: {e}");
                    tokio::time::sleep(connect_backoff(attempt)).await;
                }
                Err(e) if e.is_connect() => return Err(AgentClientError::SandboxUnavailable),
                Err(e) => return Err(AgentClientError::NetworkFault(e)),
            }
        }

        Err(AgentClientError::SandboxUnavailable)
    }
}

impl Default for SandboxRouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_rejects_non_alphanumeric_hyphen() {
        assert!(is_valid_namespace("team-1"));
        assert!(!is_valid_namespace("team.1"));
        assert!(!is_valid_namespace("team/1"));
        assert!(!is_valid_namespace(""));
    }

    #[test]
    fn backoff_caps_at_four_seconds() {
        assert_eq!(connect_backoff(0), Duration::from_secs_f64(1.0));
        assert_eq!(connect_backoff(1), Duration::from_secs_f64(2.0));
        assert_eq!(connect_backoff(2), Duration::from_secs_f64(4.0));
        assert_eq!(connect_backoff(5), Duration::from_secs_f64(4.0));
    }
}
