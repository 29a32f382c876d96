// [apps/orchestrator/src/state.rs]
use crate::settings::Settings;
use incidentfox_agent_client::AgentRuntimeClient;
use incidentfox_db::DbClient;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub settings: Arc<Settings>,
    /// Shared client for calls to vendor APIs (GitHub reactions, Slack
    /// `chat.postMessage`, PagerDuty/Incident.io timeline notes) and to
    /// config-service's internal surface.
    pub http: Client,
    pub agent_client: Arc<AgentRuntimeClient>,
}

impl AppState {
    pub fn new(db: DbClient, settings: Settings) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(60))
            .user_agent("incidentfox-orchestrator")
            .build()
            .expect("orchestrator http client must build");

        let agent_client = Arc::new(AgentRuntimeClient::new(settings.agent_runtime_base_url.clone()));

        Self { db, settings: Arc::new(settings), http, agent_client }
    }
}
