// [libs/infra/db/src/schema.rs]
//! Schema bootstrap, applied once per connection at startup. Organized
//! in three stages so a running deployment can pick up new columns and
//! indexes without a destructive migration: base tables first, then
//! additive `ALTER TABLE` statements (tolerant of "duplicate column" on
//! a database that already has them), then indexes.

use crate::errors::DbError;
use libsql::Connection;
use tracing::{debug, instrument, warn};

const BASE_TABLES: &[(&str, &str)] = &[
    ("nodes", r#"
        CREATE TABLE IF NOT EXISTS nodes (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL,
            parent_id TEXT,
            kind TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("node_configs", r#"
        CREATE TABLE IF NOT EXISTS node_configs (
            node_id TEXT PRIMARY KEY REFERENCES nodes(id),
            version INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL DEFAULT '{}',
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("node_config_history", r#"
        CREATE TABLE IF NOT EXISTS node_config_history (
            node_id TEXT NOT NULL,
            version INTEGER NOT NULL,
            data TEXT NOT NULL,
            written_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(node_id, version)
        );
    "#),
    ("org_admin_tokens", r#"
        CREATE TABLE IF NOT EXISTS org_admin_tokens (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL,
            label TEXT NOT NULL,
            secret_hash TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            revoked_at DATETIME
        );
    "#),
    ("team_tokens", r#"
        CREATE TABLE IF NOT EXISTS team_tokens (
            id TEXT PRIMARY KEY,
            node_id TEXT NOT NULL,
            label TEXT NOT NULL,
            secret_hash TEXT NOT NULL,
            permissions TEXT NOT NULL DEFAULT '[]',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            revoked_at DATETIME
        );
    "#),
    ("impersonation_jtis", r#"
        CREATE TABLE IF NOT EXISTS impersonation_jtis (
            jti TEXT PRIMARY KEY,
            node_id TEXT NOT NULL,
            minted_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            expires_at DATETIME NOT NULL
        );
    "#),
    ("integration_instances", r#"
        CREATE TABLE IF NOT EXISTS integration_instances (
            node_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            config TEXT NOT NULL DEFAULT '{}',
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(node_id, kind)
        );
    "#),
    ("routing_map", r#"
        CREATE TABLE IF NOT EXISTS routing_map (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL,
            node_id TEXT NOT NULL,
            external_kind TEXT NOT NULL,
            external_key TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(external_kind, external_key)
        );
    "#),
    ("provisioning_runs", r#"
        CREATE TABLE IF NOT EXISTS provisioning_runs (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL,
            team_node_id TEXT,
            idempotency_key TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            error TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            completed_at DATETIME,
            UNIQUE(org_id, team_node_id, idempotency_key)
        );
    "#),
    ("scheduled_jobs", r#"
        CREATE TABLE IF NOT EXISTS scheduled_jobs (
            id TEXT PRIMARY KEY,
            node_id TEXT NOT NULL,
            job_type TEXT NOT NULL,
            payload TEXT NOT NULL DEFAULT '{}',
            run_at DATETIME NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            claimed_at DATETIME,
            claimed_by TEXT,
            result TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("agent_runs", r#"
        CREATE TABLE IF NOT EXISTS agent_runs (
            id TEXT PRIMARY KEY,
            node_id TEXT NOT NULL,
            trigger_source TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'dispatched',
            sandbox_id TEXT,
            github_comment_marker TEXT,
            feedback TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            completed_at DATETIME
        );
    "#),
    ("a2a_tasks", r#"
        CREATE TABLE IF NOT EXISTS a2a_tasks (
            id TEXT PRIMARY KEY,
            parent_run_id TEXT NOT NULL,
            target_agent TEXT NOT NULL,
            payload TEXT NOT NULL DEFAULT '{}',
            status TEXT NOT NULL DEFAULT 'dispatched',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("audit_events", r#"
        CREATE TABLE IF NOT EXISTS audit_events (
            id TEXT PRIMARY KEY,
            node_id TEXT,
            run_id TEXT,
            actor TEXT NOT NULL,
            action TEXT NOT NULL,
            detail TEXT NOT NULL DEFAULT '{}',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("webhook_events", r#"
        CREATE TABLE IF NOT EXISTS webhook_events (
            vendor TEXT NOT NULL,
            vendor_event_id TEXT NOT NULL,
            node_id TEXT,
            received_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY(vendor, vendor_event_id)
        );
    "#),
];

/// Additive columns for deployments bootstrapped before this column
/// existed. `ALTER TABLE ... ADD COLUMN` fails on SQLite/libSQL if the
/// column is already there, so each statement's error is inspected and
/// swallowed only when it says "duplicate column name".
const EVOLUTIONARY_ALTERS: &[(&str, &str)] = &[
    ("agent_runs.feedback", "ALTER TABLE agent_runs ADD COLUMN feedback TEXT;"),
];

const INDEXES: &[(&str, &str)] = &[
    ("idx_nodes_parent", "CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id);"),
    ("idx_nodes_org", "CREATE INDEX IF NOT EXISTS idx_nodes_org ON nodes(org_id);"),
    (
        "idx_scheduled_jobs_due",
        "CREATE INDEX IF NOT EXISTS idx_scheduled_jobs_due ON scheduled_jobs(status, run_at);",
    ),
    (
        "idx_provisioning_idempotency",
        "CREATE INDEX IF NOT EXISTS idx_provisioning_idempotency ON provisioning_runs(org_id, team_node_id, idempotency_key);",
    ),
    ("idx_audit_run", "CREATE INDEX IF NOT EXISTS idx_audit_run ON audit_events(run_id);"),
    (
        "idx_team_tokens_node",
        "CREATE INDEX IF NOT EXISTS idx_team_tokens_node ON team_tokens(node_id);",
    ),
    (
        "idx_webhook_events_node",
        "CREATE INDEX IF NOT EXISTS idx_webhook_events_node ON webhook_events(node_id);",
    ),
];

#[instrument(skip_all)]
pub async fn apply_schema(connection: &Connection) -> Result<(), DbError> {
    for (name, statement) in BASE_TABLES {
        connection.execute(statement, ()).await?;
        debug!("schema: ensured table {name}");
    }

    for (name, statement) in EVOLUTIONARY_ALTERS {
        match connection.execute(statement, ()).await {
            Ok(_) => debug!("schema: applied evolutionary alter {name}"),
            Err(e) if e.to_string().to_lowercase().contains("duplicate column") => {
                debug!("schema: {name} already present, skipping");
            }
            Err(e) => {
                warn!("schema: evolutionary alter {name} failed: {e}");
                return Err(DbError::Query(e));
            }
        }
    }

    for (name, statement) in INDEXES {
        connection.execute(statement, ()).await?;
        debug!("schema: ensured index {name}");
    }

    Ok(())
}
