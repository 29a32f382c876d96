// [libs/infra/db/src/repositories/token.rs]
use crate::errors::DbError;
use crate::repositories::node::{parse_timestamp, parse_uuid};
use chrono::{DateTime, Utc};
use incidentfox_domain::{OrgAdminToken, TeamToken};
use libsql::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

pub struct TokenRepository {
    connection: Connection,
}

impl TokenRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, secret_hash))]
    pub async fn create_org_admin_token(
        &self,
        id: Uuid,
        org_id: Uuid,
        label: &str,
        secret_hash: &str,
    ) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO org_admin_tokens (id, org_id, label, secret_hash) VALUES (?1, ?2, ?3, ?4)",
                params![id.to_string(), org_id.to_string(), label.to_string(), secret_hash.to_string()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_org_admin_token(&self, id: Uuid) -> Result<OrgAdminToken, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, org_id, label, secret_hash, created_at, revoked_at FROM org_admin_tokens WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DbError::TokenNotFound)?;
        let id: String = row.get(0)?;
        let org_id: String = row.get(1)?;
        let label: String = row.get(2)?;
        let secret_hash: String = row.get(3)?;
        let created_at: String = row.get(4)?;
        let revoked_at: Option<String> = row.get(5)?;

        Ok(OrgAdminToken {
            id: parse_uuid(&id)?,
            org_id: parse_uuid(&org_id)?,
            label,
            secret_hash,
            created_at: parse_timestamp(&created_at)?,
            revoked_at: revoked_at.map(|ts| parse_timestamp(&ts)).transpose()?,
        })
    }

    #[instrument(skip(self, secret_hash, permissions))]
    pub async fn create_team_token(
        &self,
        id: Uuid,
        node_id: Uuid,
        label: &str,
        secret_hash: &str,
        permissions: &[String],
    ) -> Result<(), DbError> {
        let permissions_json = serde_json::to_string(permissions).map_err(|e| DbError::Mapping(e.to_string()))?;
        self.connection
            .execute(
                "INSERT INTO team_tokens (id, node_id, label, secret_hash, permissions) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    node_id.to_string(),
                    label.to_string(),
                    secret_hash.to_string(),
                    permissions_json
                ],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_team_token(&self, id: Uuid) -> Result<TeamToken, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT id, node_id, label, secret_hash, permissions, created_at, revoked_at FROM team_tokens WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DbError::TokenNotFound)?;
        let id: String = row.get(0)?;
        let node_id: String = row.get(1)?;
        let label: String = row.get(2)?;
        let secret_hash: String = row.get(3)?;
        let permissions: String = row.get(4)?;
        let created_at: String = row.get(5)?;
        let revoked_at: Option<String> = row.get(6)?;

        Ok(TeamToken {
            id: parse_uuid(&id)?,
            node_id: parse_uuid(&node_id)?,
            label,
            secret_hash,
            permissions: serde_json::from_str(&permissions).map_err(|e| DbError::Mapping(e.to_string()))?,
            created_at: parse_timestamp(&created_at)?,
            revoked_at: revoked_at.map(|ts| parse_timestamp(&ts)).transpose()?,
        })
    }

    /// Records a minted impersonation token's `jti`, when
    /// `IMPERSONATION_JTI_DB_LOGGING` is enabled at the call site.
    #[instrument(skip(self))]
    pub async fn record_impersonation_jti(&self, jti: Uuid, node_id: Uuid, expires_at: DateTime<Utc>) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO impersonation_jtis (jti, node_id, expires_at) VALUES (?1, ?2, ?3)",
                params![jti.to_string(), node_id.to_string(), expires_at.to_rfc3339()],
            )
            .await?;
        Ok(())
    }

    /// Used by the verify path when `IMPERSONATION_JTI_DB_REQUIRE` is
    /// set: a `jti` absent from the table means the token was never
    /// minted through the logging path and must be rejected.
    #[instrument(skip(self))]
    pub async fn impersonation_jti_exists(&self, jti: Uuid) -> Result<bool, DbError> {
        let mut rows = self
            .connection
            .query("SELECT 1 FROM impersonation_jtis WHERE jti = ?1", params![jti.to_string()])
            .await?;
        Ok(rows.next().await?.is_some())
    }
}
