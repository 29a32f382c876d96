// [libs/infra/db/src/repositories/webhook_event.rs]
use crate::errors::DbError;
use libsql::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

pub struct WebhookEventRepository {
    connection: Connection,
}

impl WebhookEventRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Records `(vendor, vendor_event_id)` as seen, returning `true` if
    /// this is the first time — a retried delivery of the same event
    /// hits the `(vendor, vendor_event_id)` primary key and comes back
    /// `false` without writing a second row.
    #[instrument(skip(self))]
    pub async fn record_if_new(&self, vendor: &str, vendor_event_id: &str, node_id: Option<Uuid>) -> Result<bool, DbError> {
        let result = self
            .connection
            .execute(
                "INSERT INTO webhook_events (vendor, vendor_event_id, node_id) VALUES (?1, ?2, ?3)",
                params![vendor.to_string(), vendor_event_id.to_string(), node_id.map(|id| id.to_string())],
            )
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if e.to_string().to_lowercase().contains("unique") => Ok(false),
            Err(e) => Err(DbError::Query(e)),
        }
    }
}
