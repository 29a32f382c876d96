// [libs/domain/models/src/principal.rs]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a request authenticated. Distinct from [`Permission`] — two
/// principals can carry the same permission set while differing in
/// `auth_kind`, which matters because some behavior (write-gating on
/// impersonation) keys off the kind directly rather than the permission
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    AdminShared,
    OrgAdminOpaque,
    TeamOpaque,
    AdminOidc,
    TeamOidc,
    Impersonation,
    Visitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    AdminWildcard,
    TeamRead,
    TeamWrite,
    AgentInvoke,
    AdminProvision,
    AdminAgentRun,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AdminWildcard => "admin:*",
            Permission::TeamRead => "team:read",
            Permission::TeamWrite => "team:write",
            Permission::AgentInvoke => "agent:invoke",
            Permission::AdminProvision => "admin:provision",
            Permission::AdminAgentRun => "admin:agent:run",
        }
    }
}

/// The resolved identity behind an authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub auth_kind: AuthKind,
    pub org_id: Option<Uuid>,
    pub node_id: Option<Uuid>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&Permission::AdminWildcard) || self.permissions.contains(&permission)
    }

    pub fn can_write(&self) -> bool {
        // Impersonation is read-only no matter what write flags are set
        // elsewhere; only a plain `oidc` auth_kind is ever writable.
        !matches!(self.auth_kind, AuthKind::Impersonation) && self.has(Permission::TeamWrite)
    }

    pub fn visitor(node_id: Uuid) -> Self {
        Self {
            auth_kind: AuthKind::Visitor,
            org_id: None,
            node_id: Some(node_id),
            permissions: vec![Permission::TeamRead, Permission::AgentInvoke],
        }
    }
}
