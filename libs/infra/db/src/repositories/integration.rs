// [libs/infra/db/src/repositories/integration.rs]
use crate::errors::DbError;
use incidentfox_domain::{IntegrationInstance, IntegrationKind};
use libsql::{params, Connection};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

pub struct IntegrationRepository {
    connection: Connection,
}

impl IntegrationRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Stores `config` as-is — callers pass it through
    /// `incidentfox_crypto::encrypt_dict` before calling this so secret
    /// fields are never written in plaintext.
    #[instrument(skip(self, config))]
    pub async fn upsert(&self, node_id: Uuid, kind: IntegrationKind, config: &Value) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO integration_instances (node_id, kind, config, updated_at)
                 VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
                 ON CONFLICT(node_id, kind) DO UPDATE SET config = excluded.config, updated_at = CURRENT_TIMESTAMP",
                params![node_id.to_string(), kind_to_str(kind).to_string(), config.to_string()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, node_id: Uuid, kind: IntegrationKind) -> Result<Option<IntegrationInstance>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT config FROM integration_instances WHERE node_id = ?1 AND kind = ?2",
                params![node_id.to_string(), kind_to_str(kind).to_string()],
            )
            .await?;
        let Some(row) = rows.next().await? else { return Ok(None) };
        let config: String = row.get(0)?;
        Ok(Some(IntegrationInstance {
            node_id,
            kind,
            config: serde_json::from_str(&config).map_err(|e| DbError::Mapping(e.to_string()))?,
        }))
    }
}

fn kind_to_str(kind: IntegrationKind) -> &'static str {
    match kind {
        IntegrationKind::Slack => "slack",
        IntegrationKind::GitHub => "github",
        IntegrationKind::PagerDuty => "pagerduty",
        IntegrationKind::IncidentIo => "incidentio",
        IntegrationKind::Blameless => "blameless",
        IntegrationKind::FireHydrant => "firehydrant",
        IntegrationKind::Circleback => "circleback",
        IntegrationKind::Vercel => "vercel",
        IntegrationKind::Recall => "recall",
        IntegrationKind::GoogleChat => "google_chat",
        IntegrationKind::TeamsBot => "teams_bot",
        IntegrationKind::Grafana => "grafana",
        IntegrationKind::Google => "google",
        IntegrationKind::Confluence => "confluence",
    }
}
