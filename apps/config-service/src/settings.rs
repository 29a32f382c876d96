// [apps/config-service/src/settings.rs]
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Token,
    Oidc,
    Both,
}

impl AuthMode {
    fn parse(raw: &str, var_name: &str) -> Self {
        match raw {
            "token" => AuthMode::Token,
            "oidc" => AuthMode::Oidc,
            "both" => AuthMode::Both,
            other => panic!("{var_name} must be one of token|oidc|both, got `{other}`"),
        }
    }

    pub fn allows_token(self) -> bool {
        matches!(self, AuthMode::Token | AuthMode::Both)
    }

    pub fn allows_oidc(self) -> bool {
        matches!(self, AuthMode::Oidc | AuthMode::Both)
    }
}

/// Process-wide configuration, read once at startup. Required variables
/// are only enforced when the feature they gate is actually enabled,
/// mirroring the conditional requirement pattern of the auth classifier
/// this service carries forward.
pub struct Settings {
    pub database_url: String,
    pub turso_auth_token: Option<String>,
    pub port: u16,

    pub token_pepper: Option<String>,
    pub encryption_key: String,
    pub admin_token: Option<String>,

    pub admin_auth_mode: AuthMode,
    pub team_auth_mode: AuthMode,

    pub oidc_enabled: bool,
    pub oidc_issuer: Option<String>,
    pub oidc_audience: Option<String>,
    pub oidc_jwks_json: Option<String>,
    pub oidc_org_id_claim: String,
    pub oidc_team_node_id_claim: String,

    pub impersonation_jwt_secret: String,
    pub impersonation_jwt_audience: String,
    pub impersonation_token_ttl_seconds: i64,
    pub impersonation_jti_db_logging: bool,
    pub impersonation_jti_db_require: bool,

    pub team_oidc_write_enabled: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        let admin_auth_mode = AuthMode::parse(&env::var("ADMIN_AUTH_MODE").unwrap_or_else(|_| "token".to_string()), "ADMIN_AUTH_MODE");
        let team_auth_mode = AuthMode::parse(&env::var("TEAM_AUTH_MODE").unwrap_or_else(|_| "token".to_string()), "TEAM_AUTH_MODE");
        let oidc_enabled = env_flag("OIDC_ENABLED");

        if admin_auth_mode.allows_token() || team_auth_mode.allows_token() {
            if env::var("TOKEN_PEPPER").is_err() {
                panic!("TOKEN_PEPPER is required when ADMIN_AUTH_MODE or TEAM_AUTH_MODE includes `token`");
            }
        }

        if admin_auth_mode.allows_oidc() || team_auth_mode.allows_oidc() {
            if !oidc_enabled {
                panic!("OIDC_ENABLED=1 is required when ADMIN_AUTH_MODE or TEAM_AUTH_MODE includes `oidc`");
            }
        }

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL is required"),
            turso_auth_token: env::var("TURSO_AUTH_TOKEN").ok(),
            port: env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080),

            token_pepper: env::var("TOKEN_PEPPER").ok(),
            encryption_key: env::var("ENCRYPTION_KEY").expect("ENCRYPTION_KEY is required"),
            admin_token: env::var("ADMIN_TOKEN").ok(),

            admin_auth_mode,
            team_auth_mode,

            oidc_enabled,
            oidc_issuer: env::var("OIDC_ISSUER").ok(),
            oidc_audience: env::var("OIDC_AUDIENCE").ok(),
            oidc_jwks_json: env::var("OIDC_JWKS_JSON").ok(),
            oidc_org_id_claim: env::var("OIDC_ORG_ID_CLAIM").unwrap_or_else(|_| "org_id".to_string()),
            oidc_team_node_id_claim: env::var("OIDC_TEAM_NODE_ID_CLAIM").unwrap_or_else(|_| "team_node_id".to_string()),

            impersonation_jwt_secret: env::var("IMPERSONATION_JWT_SECRET").unwrap_or_else(|_| "dev-impersonation-secret".to_string()),
            impersonation_jwt_audience: env::var("IMPERSONATION_JWT_AUDIENCE").unwrap_or_else(|_| "agent-runtime".to_string()),
            impersonation_token_ttl_seconds: env::var("IMPERSONATION_TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            impersonation_jti_db_logging: env_flag("IMPERSONATION_JTI_DB_LOGGING"),
            impersonation_jti_db_require: env_flag("IMPERSONATION_JTI_DB_REQUIRE"),

            team_oidc_write_enabled: env_flag("TEAM_OIDC_WRITE_ENABLED"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    matches!(env::var(name).as_deref(), Ok("1") | Ok("true"))
}
