// [apps/credential-proxy/src/main.rs]
use incidentfox_credential_proxy::{build_router, AppState, Settings};
use incidentfox_db::DbClient;
use incidentfox_observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("incidentfox-credential-proxy");

    let settings = Settings::from_env();
    let db = DbClient::connect(&settings.database_url, settings.turso_auth_token.clone()).await?;
    let port = settings.port;
    let state = AppState::new(db, settings);

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "credential proxy listening");
    axum::serve(listener, router).await?;

    Ok(())
}
