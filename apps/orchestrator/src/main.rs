// [apps/orchestrator/src/main.rs]
use dotenvy::dotenv;
use incidentfox_db::DbClient;
use incidentfox_observability::init_tracing;
use incidentfox_orchestrator::{build_router, AppState, Scheduler, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("incidentfox-orchestrator");

    let settings = Settings::from_env();
    let db = DbClient::connect(&settings.database_url, settings.turso_auth_token.clone()).await?;
    let port = settings.port;
    let state = AppState::new(db, settings);

    Scheduler::new(state.clone()).spawn();

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "orchestrator listening");
    axum::serve(listener, router).await?;

    Ok(())
}
