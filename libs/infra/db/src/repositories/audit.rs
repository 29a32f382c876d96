// [libs/infra/db/src/repositories/audit.rs]
use crate::errors::DbError;
use crate::repositories::node::{parse_timestamp, parse_uuid};
use incidentfox_domain::AuditEvent;
use libsql::{params, Connection};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

pub struct AuditRepository {
    connection: Connection,
}

impl AuditRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, detail))]
    pub async fn record(
        &self,
        id: Uuid,
        node_id: Option<Uuid>,
        run_id: Option<Uuid>,
        actor: &str,
        action: &str,
        detail: &Value,
    ) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO audit_events (id, node_id, run_id, actor, action, detail) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    node_id.map(|id| id.to_string()),
                    run_id.map(|id| id.to_string()),
                    actor.to_string(),
                    action.to_string(),
                    detail.to_string()
                ],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_for_run(&self, run_id: Uuid) -> Result<Vec<AuditEvent>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, node_id, run_id, actor, action, detail, created_at FROM audit_events WHERE run_id = ?1 ORDER BY created_at ASC",
                params![run_id.to_string()],
            )
            .await?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(map_event(row)?);
        }
        Ok(events)
    }

    #[instrument(skip(self))]
    pub async fn list_for_node(&self, node_id: Uuid, limit: u32) -> Result<Vec<AuditEvent>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, node_id, run_id, actor, action, detail, created_at FROM audit_events
                 WHERE node_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                params![node_id.to_string(), limit as i64],
            )
            .await?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(map_event(row)?);
        }
        Ok(events)
    }
}

fn map_event(row: libsql::Row) -> Result<AuditEvent, DbError> {
    let id: String = row.get(0)?;
    let node_id: Option<String> = row.get(1)?;
    let run_id: Option<String> = row.get(2)?;
    let actor: String = row.get(3)?;
    let action: String = row.get(4)?;
    let detail: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(AuditEvent {
        id: parse_uuid(&id)?,
        node_id: node_id.map(|id| parse_uuid(&id)).transpose()?,
        run_id: run_id.map(|id| parse_uuid(&id)).transpose()?,
        actor,
        action,
        detail: serde_json::from_str(&detail).map_err(|e| DbError::Mapping(e.to_string()))?,
        created_at: parse_timestamp(&created_at)?,
    })
}
