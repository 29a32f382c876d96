// [apps/credential-proxy/src/state.rs]
use crate::settings::Settings;
use incidentfox_db::DbClient;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub settings: Arc<Settings>,
    /// One pooled client shared across every upstream call. Connect
    /// timeout matches the 30s ceiling in the sandbox-router contract;
    /// read/write are left unbounded so an SSE stream from an upstream
    /// LLM provider is never cut mid-stream.
    pub upstream: Client,
}

impl AppState {
    pub fn new(db: DbClient, settings: Settings) -> Self {
        let upstream = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client builds with default TLS config");
        Self { db, settings: Arc::new(settings), upstream }
    }
}
