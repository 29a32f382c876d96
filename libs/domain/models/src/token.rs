// [libs/domain/models/src/token.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque bearer credential in `<id>.<secret>` wire form. Only the
/// pepper-HMAC digest of `secret` is ever persisted; `secret` itself never
/// reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueToken {
    pub id: String,
    pub secret: String,
}

impl OpaqueToken {
    /// Parses `<id>.<secret>` — exactly one dot, both halves non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (id, secret) = raw.split_once('.')?;
        if id.is_empty() || secret.is_empty() || secret.contains('.') {
            return None;
        }
        Some(Self { id: id.to_string(), secret: secret.to_string() })
    }

    pub fn to_wire(&self) -> String {
        format!("{}.{}", self.id, self.secret)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgAdminToken {
    pub id: Uuid,
    pub org_id: Uuid,
    pub label: String,
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamToken {
    pub id: Uuid,
    pub node_id: Uuid,
    pub label: String,
    pub secret_hash: String,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// A record of an impersonation JWT's `jti` at mint time, used for the
/// optional allowlist check at verify time. Only populated when
/// `IMPERSONATION_JTI_DB_LOGGING` is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpersonationJti {
    pub jti: Uuid,
    pub node_id: Uuid,
    pub minted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
