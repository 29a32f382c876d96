// [libs/domain/models/src/audit.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use crate::run::FeedbackSignal;

/// One entry in the append-only audit log: a config change, a webhook
/// intake, a dispatch decision, or a recorded feedback signal, all keyed
/// so they can be traced back to the node and (where relevant) the run
/// that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub node_id: Option<Uuid>,
    pub run_id: Option<Uuid>,
    pub actor: String,
    pub action: String,
    pub detail: Value,
    pub created_at: DateTime<Utc>,
}
