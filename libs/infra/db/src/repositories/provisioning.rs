// [libs/infra/db/src/repositories/provisioning.rs]
use crate::errors::DbError;
use crate::repositories::node::{parse_timestamp, parse_uuid};
use incidentfox_domain::{ProvisioningRun, ProvisioningStatus};
use libsql::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

pub struct ProvisioningRepository {
    connection: Connection,
}

impl ProvisioningRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Inserts a new pending run for `(org_id, team_node_id,
    /// idempotency_key)`, or returns the existing run unchanged if one
    /// already exists — this is what makes a retried webhook delivery a
    /// no-op rather than a duplicate provisioning attempt.
    #[instrument(skip(self))]
    pub async fn claim_or_fetch(
        &self,
        id: Uuid,
        org_id: Uuid,
        team_node_id: Option<Uuid>,
        idempotency_key: &str,
    ) -> Result<ProvisioningRun, DbError> {
        let insert_result = self
            .connection
            .execute(
                "INSERT INTO provisioning_runs (id, org_id, team_node_id, idempotency_key) VALUES (?1, ?2, ?3, ?4)",
                params![
                    id.to_string(),
                    org_id.to_string(),
                    team_node_id.map(|id| id.to_string()),
                    idempotency_key.to_string()
                ],
            )
            .await;

        match insert_result {
            Ok(_) => self.get(id).await,
            Err(e) if e.to_string().to_lowercase().contains("unique") => {
                self.find_existing(org_id, team_node_id, idempotency_key).await?.ok_or(DbError::ProvisioningConflict)
            }
            Err(e) => Err(DbError::Query(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: Uuid, status: ProvisioningStatus, error: Option<&str>) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE provisioning_runs SET status = ?2, error = ?3, completed_at = CURRENT_TIMESTAMP WHERE id = ?1",
                params![id.to_string(), status_to_str(status).to_string(), error.map(str::to_string)],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ProvisioningRun, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, org_id, team_node_id, idempotency_key, status, error, created_at, completed_at FROM provisioning_runs WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DbError::ProvisioningConflict)?;
        map_run(row)
    }

    async fn find_existing(
        &self,
        org_id: Uuid,
        team_node_id: Option<Uuid>,
        idempotency_key: &str,
    ) -> Result<Option<ProvisioningRun>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, org_id, team_node_id, idempotency_key, status, error, created_at, completed_at
                 FROM provisioning_runs
                 WHERE org_id = ?1 AND (team_node_id = ?2 OR (team_node_id IS NULL AND ?2 IS NULL)) AND idempotency_key = ?3",
                params![org_id.to_string(), team_node_id.map(|id| id.to_string()), idempotency_key.to_string()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(map_run(row)?)),
            None => Ok(None),
        }
    }
}

fn status_to_str(status: ProvisioningStatus) -> &'static str {
    match status {
        ProvisioningStatus::Pending => "pending",
        ProvisioningStatus::Completed => "completed",
        ProvisioningStatus::Failed => "failed",
    }
}

fn status_from_str(raw: &str) -> Result<ProvisioningStatus, DbError> {
    match raw {
        "pending" => Ok(ProvisioningStatus::Pending),
        "completed" => Ok(ProvisioningStatus::Completed),
        "failed" => Ok(ProvisioningStatus::Failed),
        other => Err(DbError::Mapping(format!("unknown provisioning status `{other}`"))),
    }
}

fn map_run(row: libsql::Row) -> Result<ProvisioningRun, DbError> {
    let id: String = row.get(0)?;
    let org_id: String = row.get(1)?;
    let team_node_id: Option<String> = row.get(2)?;
    let idempotency_key: String = row.get(3)?;
    let status: String = row.get(4)?;
    let error: Option<String> = row.get(5)?;
    let created_at: String = row.get(6)?;
    let completed_at: Option<String> = row.get(7)?;

    Ok(ProvisioningRun {
        id: parse_uuid(&id)?,
        org_id: parse_uuid(&org_id)?,
        team_node_id: team_node_id.map(|id| parse_uuid(&id)).transpose()?,
        idempotency_key,
        status: status_from_str(&status)?,
        error,
        created_at: parse_timestamp(&created_at)?,
        completed_at: completed_at.map(|ts| parse_timestamp(&ts)).transpose()?,
    })
}
