// [apps/credential-proxy/src/providers/registry.rs]
use reqwest::RequestBuilder;
use serde_json::Value;

/// How a provider's credential fields turn into an outbound request's
/// auth. Everything here reads from the integration's decrypted config
/// block, never from the inbound request — the sandbox never carries
/// its own upstream credentials.
pub enum AuthScheme {
    Bearer { field: &'static str },
    Basic { user_field: &'static str, pass_field: &'static str },
    TokenPrefix { field: &'static str },
    ApiKeyColon { id_field: &'static str, secret_field: &'static str },
    /// One or more `(header_name, config_field)` pairs, each copied
    /// verbatim — covers `DD-API-KEY`/`DD-APPLICATION-KEY`,
    /// `X-Scope-OrgID`, and similar vendor-specific header credentials.
    Headers(&'static [(&'static str, &'static str)]),
    /// Anthropic's own scheme: `x-api-key` plus a fixed version header,
    /// used both for the direct `claude/` passthrough and whenever a
    /// provider's native API expects the same shape.
    AnthropicApiKey,
}

pub struct ProviderSpec {
    pub path_prefix: &'static str,
    pub integration_id: &'static str,
    pub default_base_url: &'static str,
    pub required_fields: &'static [&'static str],
    pub auth: AuthScheme,
}

pub const PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        path_prefix: "claude",
        integration_id: "anthropic",
        default_base_url: "https://api.anthropic.com",
        required_fields: &["api_key"],
        auth: AuthScheme::AnthropicApiKey,
    },
    ProviderSpec {
        path_prefix: "openai",
        integration_id: "openai",
        default_base_url: "https://api.openai.com",
        required_fields: &["api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "gemini",
        integration_id: "gemini",
        default_base_url: "https://generativelanguage.googleapis.com",
        required_fields: &["api_key"],
        auth: AuthScheme::Headers(&[("x-goog-api-key", "api_key")]),
    },
    ProviderSpec {
        path_prefix: "deepseek",
        integration_id: "deepseek",
        default_base_url: "https://api.deepseek.com",
        required_fields: &["api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "moonshot",
        integration_id: "moonshot",
        default_base_url: "https://api.moonshot.cn",
        required_fields: &["api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "minimax",
        integration_id: "minimax",
        default_base_url: "https://api.minimax.chat",
        required_fields: &["api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "xai",
        integration_id: "xai",
        default_base_url: "https://api.x.ai",
        required_fields: &["api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "mistral",
        integration_id: "mistral",
        default_base_url: "https://api.mistral.ai",
        required_fields: &["api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "bedrock",
        integration_id: "bedrock",
        default_base_url: "",
        required_fields: &["domain", "api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "azure_ai",
        integration_id: "azure_ai",
        default_base_url: "",
        required_fields: &["domain", "api_key"],
        auth: AuthScheme::Headers(&[("api-key", "api_key")]),
    },
    ProviderSpec {
        path_prefix: "openrouter",
        integration_id: "openrouter",
        default_base_url: "https://openrouter.ai",
        required_fields: &["api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "github",
        integration_id: "github",
        default_base_url: "https://api.github.com",
        required_fields: &["token"],
        auth: AuthScheme::TokenPrefix { field: "token" },
    },
    ProviderSpec {
        path_prefix: "pagerduty",
        integration_id: "pagerduty",
        default_base_url: "https://api.pagerduty.com",
        required_fields: &["api_key"],
        auth: AuthScheme::TokenPrefix { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "incidentio",
        integration_id: "incidentio",
        default_base_url: "https://api.incident.io",
        required_fields: &["api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "grafana",
        integration_id: "grafana",
        default_base_url: "",
        required_fields: &["domain", "api_key"],
        auth: AuthScheme::Bearer { field: "api_key" },
    },
    ProviderSpec {
        path_prefix: "datadog",
        integration_id: "datadog",
        default_base_url: "https://api.datadoghq.com",
        required_fields: &["api_key", "application_key"],
        auth: AuthScheme::Headers(&[("DD-API-KEY", "api_key"), ("DD-APPLICATION-KEY", "application_key")]),
    },
    ProviderSpec {
        path_prefix: "loki",
        integration_id: "loki",
        default_base_url: "",
        required_fields: &["domain", "org_id"],
        auth: AuthScheme::Headers(&[("X-Scope-OrgID", "org_id")]),
    },
    ProviderSpec {
        path_prefix: "elasticsearch",
        integration_id: "elasticsearch",
        default_base_url: "",
        required_fields: &["domain", "username", "password"],
        auth: AuthScheme::Basic { user_field: "username", pass_field: "password" },
    },
    ProviderSpec {
        path_prefix: "splunk",
        integration_id: "splunk",
        default_base_url: "",
        required_fields: &["domain", "token"],
        auth: AuthScheme::TokenPrefix { field: "token" },
    },
    ProviderSpec {
        path_prefix: "confluence",
        integration_id: "confluence",
        default_base_url: "",
        required_fields: &["domain", "username", "api_key"],
        auth: AuthScheme::Basic { user_field: "username", pass_field: "api_key" },
    },
];

pub fn find(path_prefix: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|p| p.path_prefix == path_prefix)
}

/// Looks up `provider` by the `x-llm-model` header or a `provider/model`
/// prefix on the `model` field of a Messages request body, per the LLM
/// routing rule in the credential proxy's contract.
pub fn find_for_model(model: &str) -> Option<&'static ProviderSpec> {
    if let Some((prefix, _)) = model.split_once('/') {
        return find(prefix);
    }
    find("claude")
}

pub fn missing_required_fields(spec: &ProviderSpec, config: &Value) -> Vec<String> {
    spec.required_fields
        .iter()
        .filter(|field| config.get(**field).and_then(Value::as_str).map(str::is_empty).unwrap_or(true))
        .map(|field| field.to_string())
        .collect()
}

fn field(config: &Value, name: &str) -> String {
    config.get(name).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Injects the provider's credential onto `builder` from `config`, the
/// integration's already-decrypted fields. Never reads anything from the
/// inbound sandbox request.
pub fn apply_auth(spec: &ProviderSpec, config: &Value, builder: RequestBuilder) -> RequestBuilder {
    match &spec.auth {
        AuthScheme::Bearer { field: key } => builder.bearer_auth(field(config, key)),
        AuthScheme::Basic { user_field, pass_field } => builder.basic_auth(field(config, user_field), Some(field(config, pass_field))),
        AuthScheme::TokenPrefix { field: key } => builder.header("Authorization", format!("token {}", field(config, key))),
        AuthScheme::ApiKeyColon { id_field, secret_field } => {
            builder.header("Authorization", format!("ApiKey {}:{}", field(config, id_field), field(config, secret_field)))
        }
        AuthScheme::Headers(pairs) => pairs.iter().fold(builder, |b, (header, cfg_field)| b.header(*header, field(config, cfg_field))),
        AuthScheme::AnthropicApiKey => builder
            .header("x-api-key", field(config, "api_key"))
            .header("anthropic-version", "2023-06-01"),
    }
}

/// Resolves the upstream base URL: the integration's own `domain`/
/// `api_host` field if set, otherwise the provider's built-in default.
pub fn base_url(spec: &ProviderSpec, config: &Value) -> String {
    let custom = config.get("domain").or_else(|| config.get("api_host")).and_then(Value::as_str);
    match custom {
        Some(domain) if !domain.is_empty() => {
            if domain.starts_with("http://") || domain.starts_with("https://") {
                domain.trim_end_matches('/').to_string()
            } else {
                format!("https://{}", domain.trim_end_matches('/'))
            }
        }
        _ => spec.default_base_url.to_string(),
    }
}
