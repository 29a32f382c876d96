// [apps/credential-proxy/src/settings.rs]
use std::env;

/// Process-wide configuration, read once at startup. The proxy is
/// otherwise stateless — everything else it needs comes from the
/// sandbox JWT and the node store's effective config on each request.
pub struct Settings {
    pub database_url: String,
    pub turso_auth_token: Option<String>,
    pub port: u16,
    pub sandbox_jwt_secret: String,
    pub encryption_key: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL is required"),
            turso_auth_token: env::var("TURSO_AUTH_TOKEN").ok(),
            port: env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8081),
            sandbox_jwt_secret: env::var("IMPERSONATION_JWT_SECRET")
                .or_else(|_| env::var("SANDBOX_JWT_SECRET"))
                .expect("SANDBOX_JWT_SECRET (or IMPERSONATION_JWT_SECRET) is required"),
            encryption_key: env::var("ENCRYPTION_KEY").expect("ENCRYPTION_KEY is required"),
        }
    }
}
