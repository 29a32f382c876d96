// [libs/domain/models/src/integration.rs]
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    Slack,
    GitHub,
    PagerDuty,
    IncidentIo,
    Blameless,
    FireHydrant,
    Circleback,
    Vercel,
    Recall,
    GoogleChat,
    TeamsBot,
    Grafana,
    Google,
    Confluence,
}

/// The registry's description of what an integration kind requires: which
/// fields are secrets (and therefore routed through `encrypt_dict`) and
/// which are plain config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationSchema {
    pub kind: IntegrationKind,
    pub required_fields: Vec<String>,
    pub secret_fields: Vec<String>,
}

/// A configured instance of an integration on a node — the decrypted
/// credential fields plus whatever else the schema's `required_fields`
/// calls for, e.g. a Slack bot token alongside a default channel id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationInstance {
    pub node_id: Uuid,
    pub kind: IntegrationKind,
    pub config: Value,
}
