// [apps/orchestrator/src/settings.rs]
use std::env;

/// Process-wide configuration, read once at startup. Every vendor
/// webhook secret here is shared across all tenants — each vendor
/// integration is a single app/workspace installation, not a
/// per-tenant credential, so there's nothing to look up per node before
/// a signature can even be checked.
pub struct Settings {
    pub database_url: String,
    pub turso_auth_token: Option<String>,
    pub port: u16,
    pub config_service_base_url: String,
    pub agent_runtime_base_url: String,
    /// Identifies this process to the scheduler's `due` endpoint so two
    /// schedulers never believe they claimed the same job.
    pub internal_service_id: String,
    pub impersonation_jwt_secret: String,
    pub sandbox_jwt_secret: String,
    /// Shared secret for the admin-gated surface this service owns
    /// (`/api/v1/admin/provision/team`, `/api/v1/admin/agents/run`) —
    /// everything else either needs no principal or is reached only from
    /// inside the cluster.
    pub admin_token: Option<String>,
    pub token_pepper: Option<String>,
    pub poll_interval_seconds: u64,
    pub github_app_webhook_secret: Option<String>,
    pub slack_signing_secret: Option<String>,
    pub pagerduty_webhook_secret: Option<String>,
    pub incidentio_webhook_secret: Option<String>,
    /// Shared by Blameless/FireHydrant/Circleback/Vercel/Recall — no
    /// ground-truth signature scheme was available for these, so they
    /// settle for one generic HMAC secret rather than five invented
    /// per-vendor ones.
    pub generic_vendor_webhook_secret: Option<String>,
    pub google_chat_bearer_token: Option<String>,
    pub teams_bot_app_secret: Option<String>,
    /// Decrypts integration configs read out of a node's effective
    /// config, same key credential-proxy uses — fan-out posts to Slack
    /// and GitHub with the tenant's own bot tokens, not a shared one.
    pub encryption_key: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL is required"),
            turso_auth_token: env::var("TURSO_AUTH_TOKEN").ok(),
            port: env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8082),
            config_service_base_url: env::var("CONFIG_SERVICE_BASE_URL").expect("CONFIG_SERVICE_BASE_URL is required"),
            agent_runtime_base_url: env::var("AGENT_RUNTIME_BASE_URL").expect("AGENT_RUNTIME_BASE_URL is required"),
            internal_service_id: env::var("INTERNAL_SERVICE_ID").unwrap_or_else(|_| format!("orchestrator-{}", uuid::Uuid::new_v4())),
            impersonation_jwt_secret: env::var("IMPERSONATION_JWT_SECRET").expect("IMPERSONATION_JWT_SECRET is required"),
            sandbox_jwt_secret: env::var("SANDBOX_JWT_SECRET")
                .or_else(|_| env::var("IMPERSONATION_JWT_SECRET"))
                .expect("SANDBOX_JWT_SECRET (or IMPERSONATION_JWT_SECRET) is required"),
            admin_token: env::var("ADMIN_TOKEN").ok(),
            token_pepper: env::var("TOKEN_PEPPER").ok(),
            poll_interval_seconds: env::var("SCHEDULER_POLL_INTERVAL_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(30),
            github_app_webhook_secret: env::var("GITHUB_APP_WEBHOOK_SECRET").ok(),
            slack_signing_secret: env::var("SLACK_SIGNING_SECRET").ok(),
            pagerduty_webhook_secret: env::var("PAGERDUTY_WEBHOOK_SECRET").ok(),
            incidentio_webhook_secret: env::var("INCIDENTIO_WEBHOOK_SECRET").ok(),
            generic_vendor_webhook_secret: env::var("GENERIC_VENDOR_WEBHOOK_SECRET").ok(),
            google_chat_bearer_token: env::var("GOOGLE_CHAT_BEARER_TOKEN").ok(),
            teams_bot_app_secret: env::var("TEAMS_BOT_APP_SECRET").ok(),
            encryption_key: env::var("ENCRYPTION_KEY").expect("ENCRYPTION_KEY is required"),
        }
    }
}
