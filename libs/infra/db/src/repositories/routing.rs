// [libs/infra/db/src/repositories/routing.rs]
use crate::errors::DbError;
use crate::repositories::node::parse_uuid;
use incidentfox_domain::RoutingMap;
use libsql::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

pub struct RoutingRepository {
    connection: Connection,
}

impl RoutingRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Binds `external_key` to `node_id`. The `(external_kind,
    /// external_key)` unique index is the actual enforcement point — a
    /// Slack channel or GitHub repo can only ever route to one team, and
    /// a second insert attempt surfaces as [`DbError::RoutingConflict`]
    /// rather than silently overwriting the existing mapping.
    #[instrument(skip(self))]
    pub async fn bind(
        &self,
        org_id: Uuid,
        node_id: Uuid,
        external_kind: &str,
        external_key: &str,
    ) -> Result<(), DbError> {
        let result = self
            .connection
            .execute(
                "INSERT INTO routing_map (id, org_id, node_id, external_kind, external_key) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    org_id.to_string(),
                    node_id.to_string(),
                    external_kind.to_string(),
                    external_key.to_string()
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().to_lowercase().contains("unique") => Err(DbError::RoutingConflict {
                external_kind: external_kind.to_string(),
                external_key: external_key.to_string(),
            }),
            Err(e) => Err(DbError::Query(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, external_kind: &str, external_key: &str) -> Result<Option<RoutingMap>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, org_id, node_id, external_kind, external_key, created_at FROM routing_map WHERE external_kind = ?1 AND external_key = ?2",
                params![external_kind.to_string(), external_key.to_string()],
            )
            .await?;
        let Some(row) = rows.next().await? else { return Ok(None) };

        let id: String = row.get(0)?;
        let org_id: String = row.get(1)?;
        let node_id: String = row.get(2)?;
        let external_kind: String = row.get(3)?;
        let external_key: String = row.get(4)?;
        let created_at: String = row.get(5)?;

        Ok(Some(RoutingMap {
            id: parse_uuid(&id)?,
            org_id: parse_uuid(&org_id)?,
            node_id: parse_uuid(&node_id)?,
            external_kind,
            external_key,
            created_at: crate::repositories::node::parse_timestamp(&created_at)?,
        }))
    }
}
