// [apps/config-service/src/main.rs]
use dotenvy::dotenv;
use incidentfox_config_service::routes::build_router;
use incidentfox_config_service::{AppState, Settings};
use incidentfox_db::DbClient;
use incidentfox_observability::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("incidentfox-config-service");

    let settings = Settings::from_env();
    let db = DbClient::connect(&settings.database_url, settings.turso_auth_token.clone()).await?;
    let port = settings.port;
    let state = AppState::new(db, settings);

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("config-service listening on port {port}");
    axum::serve(listener, router).await?;

    Ok(())
}
