// [apps/config-service/src/state.rs]
use crate::settings::Settings;
use incidentfox_db::DbClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: DbClient, settings: Settings) -> Self {
        Self { db, settings: Arc::new(settings) }
    }
}
