// [libs/infra/db/src/repositories/scheduler.rs]
use crate::errors::DbError;
use crate::repositories::node::{parse_timestamp, parse_uuid};
use chrono::{DateTime, Utc};
use incidentfox_domain::{ScheduledJob, ScheduledJobStatus};
use libsql::{params, Connection};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

pub struct SchedulerRepository {
    connection: Connection,
}

impl SchedulerRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, payload))]
    pub async fn enqueue(&self, id: Uuid, node_id: Uuid, job_type: &str, payload: &Value, run_at: DateTime<Utc>) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO scheduled_jobs (id, node_id, job_type, payload, run_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id.to_string(), node_id.to_string(), job_type.to_string(), payload.to_string(), run_at.to_rfc3339()],
            )
            .await?;
        Ok(())
    }

    /// Atomically dequeues up to `limit` due, unclaimed jobs for
    /// `claimant`. The claim itself is a conditional `UPDATE ... WHERE
    /// claimed_at IS NULL` per candidate row — on SQLite/libSQL a single
    /// statement is already serialized against concurrent writers, so
    /// this is the equivalent of `SELECT ... FOR UPDATE SKIP LOCKED` on a
    /// server database: at most one claimant's `UPDATE` can ever affect
    /// a given row, and a row that another process claimed first is
    /// simply skipped (zero rows affected) rather than blocking.
    #[instrument(skip(self))]
    pub async fn claim_due_jobs(&self, claimant: &str, now: DateTime<Utc>, limit: u32) -> Result<Vec<ScheduledJob>, DbError> {
        let mut candidate_rows = self
            .connection
            .query(
                "SELECT id FROM scheduled_jobs WHERE status = 'pending' AND run_at <= ?1 ORDER BY run_at ASC LIMIT ?2",
                params![now.to_rfc3339(), limit as i64],
            )
            .await?;

        let mut candidate_ids = Vec::new();
        while let Some(row) = candidate_rows.next().await? {
            let id: String = row.get(0)?;
            candidate_ids.push(id);
        }

        let mut claimed = Vec::new();
        for id in candidate_ids {
            let affected = self
                .connection
                .execute(
                    "UPDATE scheduled_jobs SET status = 'claimed', claimed_at = ?2, claimed_by = ?3
                     WHERE id = ?1 AND claimed_at IS NULL",
                    params![id.clone(), now.to_rfc3339(), claimant.to_string()],
                )
                .await?;
            if affected == 1 {
                claimed.push(self.get(parse_uuid(&id)?).await?);
            }
        }

        Ok(claimed)
    }

    #[instrument(skip(self, result))]
    pub async fn complete(&self, id: Uuid, status: ScheduledJobStatus, result: Option<&Value>) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE scheduled_jobs SET status = ?2, result = ?3 WHERE id = ?1",
                params![id.to_string(), status_to_str(status).to_string(), result.map(|v| v.to_string())],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ScheduledJob, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, node_id, job_type, payload, run_at, status, claimed_at, claimed_by, result, created_at FROM scheduled_jobs WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DbError::JobNotClaimable)?;
        map_job(row)
    }
}

fn status_to_str(status: ScheduledJobStatus) -> &'static str {
    match status {
        ScheduledJobStatus::Pending => "pending",
        ScheduledJobStatus::Claimed => "claimed",
        ScheduledJobStatus::Completed => "completed",
        ScheduledJobStatus::Failed => "failed",
    }
}

fn status_from_str(raw: &str) -> Result<ScheduledJobStatus, DbError> {
    match raw {
        "pending" => Ok(ScheduledJobStatus::Pending),
        "claimed" => Ok(ScheduledJobStatus::Claimed),
        "completed" => Ok(ScheduledJobStatus::Completed),
        "failed" => Ok(ScheduledJobStatus::Failed),
        other => Err(DbError::Mapping(format!("unknown job status `{other}`"))),
    }
}

fn map_job(row: libsql::Row) -> Result<ScheduledJob, DbError> {
    let id: String = row.get(0)?;
    let node_id: String = row.get(1)?;
    let job_type: String = row.get(2)?;
    let payload: String = row.get(3)?;
    let run_at: String = row.get(4)?;
    let status: String = row.get(5)?;
    let claimed_at: Option<String> = row.get(6)?;
    let claimed_by: Option<String> = row.get(7)?;
    let result: Option<String> = row.get(8)?;
    let created_at: String = row.get(9)?;

    Ok(ScheduledJob {
        id: parse_uuid(&id)?,
        node_id: parse_uuid(&node_id)?,
        job_type,
        payload: serde_json::from_str(&payload).map_err(|e| DbError::Mapping(e.to_string()))?,
        run_at: parse_timestamp(&run_at)?,
        status: status_from_str(&status)?,
        claimed_at: claimed_at.map(|ts| parse_timestamp(&ts)).transpose()?,
        claimed_by,
        result: result.map(|r| serde_json::from_str(&r)).transpose().map_err(|e| DbError::Mapping(e.to_string()))?,
        created_at: parse_timestamp(&created_at)?,
    })
}
