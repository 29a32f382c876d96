// [libs/domain/models/src/routing.rs]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binds one external routing key (a Slack channel id, a GitHub repo full
/// name, a PagerDuty service id) to exactly one team node. Enforced by a
/// unique index on `(external_kind, external_key)` at the persistence
/// layer — this type is the row shape, not the constraint itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingMap {
    pub id: Uuid,
    pub org_id: Uuid,
    pub node_id: Uuid,
    pub external_kind: String,
    pub external_key: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
