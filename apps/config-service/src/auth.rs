// [apps/config-service/src/auth.rs]
use crate::errors::ApiError;
use crate::oidc;
use crate::state::AppState;
use incidentfox_crypto::{constant_time_eq, verify_impersonation_token, verify_token};
use incidentfox_db::{NodeRepository, TokenRepository};
use incidentfox_domain::{AuthKind, OpaqueToken, Permission, Principal};
use tracing::instrument;

/// Classifies a bearer credential into a [`Principal`] using the same
/// dot-counting dispatch as the system this carries forward: zero dots is
/// the admin shared secret, one dot is an opaque `<id>.<secret>` token
/// (org-admin tried before team), two dots is a JWT (admin OIDC tried
/// before team OIDC/impersonation/visitor).
#[instrument(skip(bearer, state))]
pub async fn classify(bearer: &str, state: &AppState) -> Result<Principal, ApiError> {
    match bearer.matches('.').count() {
        0 => classify_admin_shared(bearer, state),
        1 => classify_opaque(bearer, state).await,
        2 => classify_jwt(bearer, state).await,
        _ => Err(ApiError::InvalidToken),
    }
}

fn classify_admin_shared(bearer: &str, state: &AppState) -> Result<Principal, ApiError> {
    if !state.settings.admin_auth_mode.allows_token() {
        return Err(ApiError::InvalidToken);
    }
    let Some(admin_token) = &state.settings.admin_token else { return Err(ApiError::InvalidToken) };
    if constant_time_eq(bearer.as_bytes(), admin_token.as_bytes()) {
        Ok(Principal {
            auth_kind: AuthKind::AdminShared,
            org_id: None,
            node_id: None,
            permissions: vec![Permission::AdminWildcard],
        })
    } else {
        Err(ApiError::InvalidToken)
    }
}

async fn classify_opaque(bearer: &str, state: &AppState) -> Result<Principal, ApiError> {
    if !state.settings.team_auth_mode.allows_token() {
        return Err(ApiError::InvalidToken);
    }
    let Some(opaque) = OpaqueToken::parse(bearer) else { return Err(ApiError::InvalidToken) };
    let Some(pepper) = &state.settings.token_pepper else { return Err(ApiError::InvalidToken) };

    let connection = state.db.connection()?;
    let tokens = TokenRepository::new(connection);

    if let Ok(org_admin_id) = uuid::Uuid::parse_str(&opaque.id) {
        if let Ok(record) = tokens.get_org_admin_token(org_admin_id).await {
            if record.revoked_at.is_none() && verify_token(pepper, &opaque.secret, &record.secret_hash) {
                return Ok(Principal {
                    auth_kind: AuthKind::OrgAdminOpaque,
                    org_id: Some(record.org_id),
                    node_id: None,
                    permissions: vec![Permission::AdminWildcard],
                });
            }
        }

        if let Ok(record) = tokens.get_team_token(org_admin_id).await {
            if record.revoked_at.is_none() && verify_token(pepper, &opaque.secret, &record.secret_hash) {
                return Ok(Principal {
                    auth_kind: AuthKind::TeamOpaque,
                    org_id: None,
                    node_id: Some(record.node_id),
                    permissions: parse_permissions(&record.permissions),
                });
            }
        }
    }

    Err(ApiError::InvalidToken)
}

async fn classify_jwt(bearer: &str, state: &AppState) -> Result<Principal, ApiError> {
    if state.settings.oidc_enabled {
        if let Some(claims) = oidc::verify(bearer, &state.settings) {
            if claims.is_admin {
                return Ok(Principal {
                    auth_kind: AuthKind::AdminOidc,
                    org_id: claims.org_id,
                    node_id: None,
                    permissions: vec![Permission::AdminWildcard],
                });
            }

            if let Some(node_id) = claims.team_node_id {
                let mut permissions = vec![Permission::TeamRead, Permission::AgentInvoke];
                if state.settings.team_oidc_write_enabled {
                    permissions.push(Permission::TeamWrite);
                }
                return Ok(Principal { auth_kind: AuthKind::TeamOidc, org_id: claims.org_id, node_id: Some(node_id), permissions });
            }

            // A verified OIDC token that names neither an admin group nor
            // a team claim still proves who signed it: fall through to a
            // visitor scoped to the token's own (signature-checked)
            // subject, if it names an existing node.
            if let Ok(node_id) = uuid::Uuid::parse_str(&claims.subject) {
                let connection = state.db.connection()?;
                let nodes = NodeRepository::new(connection);
                if nodes.get_node(node_id).await.is_ok() {
                    return Ok(Principal::visitor(node_id));
                }
            }
        }
    }

    if let Ok(claims) = verify_impersonation_token(&state.settings.impersonation_jwt_secret, bearer) {
        if state.settings.impersonation_jti_db_require {
            let connection = state.db.connection()?;
            let tokens = TokenRepository::new(connection);
            if !tokens.impersonation_jti_exists(claims.jti).await? {
                return Err(ApiError::InvalidToken);
            }
        }
        return Ok(Principal {
            auth_kind: AuthKind::Impersonation,
            org_id: None,
            node_id: Some(claims.sub),
            permissions: vec![Permission::TeamRead, Permission::TeamWrite, Permission::AgentInvoke],
        });
    }

    Err(ApiError::InvalidToken)
}

fn parse_permissions(raw: &[String]) -> Vec<Permission> {
    raw.iter()
        .filter_map(|p| match p.as_str() {
            "admin:*" => Some(Permission::AdminWildcard),
            "team:read" => Some(Permission::TeamRead),
            "team:write" => Some(Permission::TeamWrite),
            "agent:invoke" => Some(Permission::AgentInvoke),
            "admin:provision" => Some(Permission::AdminProvision),
            "admin:agent:run" => Some(Permission::AdminAgentRun),
            _ => None,
        })
        .collect()
}
