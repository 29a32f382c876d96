// [libs/infra/db/src/repositories/node.rs]
use crate::errors::DbError;
use chrono::{DateTime, Utc};
use incidentfox_domain::{deep_merge, EffectiveConfig, Node, NodeConfig, NodeKind};
use libsql::{params, Connection};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

pub struct NodeRepository {
    connection: Connection,
}

impl NodeRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self))]
    pub async fn create_node(&self, node: &Node) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO nodes (id, org_id, parent_id, kind, name) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    node.id.to_string(),
                    node.org_id.to_string(),
                    node.parent_id.map(|id| id.to_string()),
                    kind_to_str(node.kind).to_string(),
                    node.name.clone()
                ],
            )
            .await?;

        self.connection
            .execute(
                "INSERT INTO node_configs (node_id, version, data) VALUES (?1, 0, '{}')",
                params![node.id.to_string()],
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_node(&self, node_id: Uuid) -> Result<Node, DbError> {
        let mut rows = self
            .connection
            .query("SELECT id, org_id, parent_id, kind, name, created_at, updated_at FROM nodes WHERE id = ?1", params![node_id.to_string()])
            .await?;
        let row = rows.next().await?.ok_or(DbError::NodeNotFound)?;
        map_node(row)
    }

    /// Returns the node's ancestor chain from the org root down to and
    /// including the node itself, by walking `parent_id` one hop at a
    /// time. Small trees only — this is not meant for deep hierarchies.
    #[instrument(skip(self))]
    pub async fn get_ancestor_chain(&self, node_id: Uuid) -> Result<Vec<Node>, DbError> {
        let mut chain = vec![self.get_node(node_id).await?];
        while let Some(parent_id) = chain.last().unwrap().parent_id {
            chain.push(self.get_node(parent_id).await?);
        }
        chain.reverse();
        Ok(chain)
    }

    #[instrument(skip(self))]
    pub async fn get_config(&self, node_id: Uuid) -> Result<NodeConfig, DbError> {
        let mut rows = self
            .connection
            .query("SELECT node_id, version, data, updated_at FROM node_configs WHERE node_id = ?1", params![node_id.to_string()])
            .await?;
        let row = rows.next().await?.ok_or(DbError::NodeNotFound)?;
        map_node_config(row)
    }

    /// Walks the node's ancestor chain and deep-merges each config
    /// document in order, root first.
    #[instrument(skip(self))]
    pub async fn get_effective_config(&self, node_id: Uuid) -> Result<EffectiveConfig, DbError> {
        let chain = self.get_ancestor_chain(node_id).await?;
        let mut documents = Vec::with_capacity(chain.len());
        for node in &chain {
            documents.push(self.get_config(node.id).await?.data);
        }
        Ok(EffectiveConfig::resolve(node_id, &documents))
    }

    /// Applies `patch` to the node's own config document via the same
    /// deep-merge semantics used to compute effective config, bumps the
    /// version, and archives the prior document into
    /// `node_config_history`. Caller is responsible for validating the
    /// patch against immutable keys first.
    #[instrument(skip(self, patch))]
    pub async fn patch_config(&self, node_id: Uuid, patch: &Value) -> Result<NodeConfig, DbError> {
        let current = self.get_config(node_id).await?;
        let merged = deep_merge(&current.data, patch);
        let next_version = current.version + 1;

        let tx = self.connection.transaction().await.map_err(|_| DbError::Transaction)?;

        tx.execute(
            "INSERT INTO node_config_history (node_id, version, data) VALUES (?1, ?2, ?3)",
            params![node_id.to_string(), current.version as i64, current.data.to_string()],
        )
        .await?;

        tx.execute(
            "UPDATE node_configs SET version = ?2, data = ?3, updated_at = CURRENT_TIMESTAMP WHERE node_id = ?1",
            params![node_id.to_string(), next_version as i64, merged.to_string()],
        )
        .await?;

        tx.commit().await.map_err(|_| DbError::Transaction)?;

        Ok(NodeConfig { node_id, version: next_version, data: merged, updated_at: Utc::now() })
    }
}

fn kind_to_str(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Org => "org",
        NodeKind::SubTeam => "sub_team",
        NodeKind::Team => "team",
    }
}

fn kind_from_str(raw: &str) -> Result<NodeKind, DbError> {
    match raw {
        "org" => Ok(NodeKind::Org),
        "sub_team" => Ok(NodeKind::SubTeam),
        "team" => Ok(NodeKind::Team),
        other => Err(DbError::Mapping(format!("unknown node kind `{other}`"))),
    }
}

fn map_node(row: libsql::Row) -> Result<Node, DbError> {
    let id: String = row.get(0)?;
    let org_id: String = row.get(1)?;
    let parent_id: Option<String> = row.get(2)?;
    let kind: String = row.get(3)?;
    let name: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Node {
        id: parse_uuid(&id)?,
        org_id: parse_uuid(&org_id)?,
        parent_id: parent_id.map(|p| parse_uuid(&p)).transpose()?,
        kind: kind_from_str(&kind)?,
        name,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn map_node_config(row: libsql::Row) -> Result<NodeConfig, DbError> {
    let node_id: String = row.get(0)?;
    let version: i64 = row.get(1)?;
    let data: String = row.get(2)?;
    let updated_at: String = row.get(3)?;

    Ok(NodeConfig {
        node_id: parse_uuid(&node_id)?,
        version: version as u32,
        data: serde_json::from_str(&data).map_err(|e| DbError::Mapping(e.to_string()))?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Mapping(e.to_string()))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|naive| naive.and_utc())
        })
        .map_err(|e| DbError::Mapping(e.to_string()))
}
