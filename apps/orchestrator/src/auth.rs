// [apps/orchestrator/src/auth.rs]
use crate::errors::OrchestratorError;
use crate::state::AppState;
use incidentfox_crypto::{constant_time_eq, verify_impersonation_token};
use incidentfox_domain::{AuthKind, Permission, Principal};

/// Classifies a bearer credential for this service's one principal-gated
/// route. Only two shapes are recognized: the admin shared secret, and
/// an impersonation JWT minted by config-service for a specific team —
/// everything else this service does is either public intake or an
/// internal, network-boundary-trusted call.
pub fn classify(bearer: &str, state: &AppState) -> Result<Principal, OrchestratorError> {
    if let Some(admin_token) = &state.settings.admin_token {
        if constant_time_eq(bearer.as_bytes(), admin_token.as_bytes()) {
            return Ok(Principal { auth_kind: AuthKind::AdminShared, org_id: None, node_id: None, permissions: vec![Permission::AdminWildcard] });
        }
    }

    if let Ok(claims) = verify_impersonation_token(&state.settings.impersonation_jwt_secret, bearer) {
        return Ok(Principal {
            auth_kind: AuthKind::Impersonation,
            org_id: None,
            node_id: Some(claims.sub),
            permissions: vec![Permission::TeamRead, Permission::TeamWrite, Permission::AgentInvoke],
        });
    }

    Err(OrchestratorError::PermissionDenied)
}
