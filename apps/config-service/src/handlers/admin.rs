// [apps/config-service/src/handlers/admin.rs]
use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use incidentfox_crypto::{generate_opaque_token, hash_token, mint_impersonation_token};
use incidentfox_db::TokenRepository;
use incidentfox_db::NodeRepository;
use incidentfox_domain::{Node, NodeKind, OpaqueToken, Permission, Principal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateOrgRequest {
    pub name: String,
}

/// `POST /api/v1/admin/orgs` — creates the root org node. An org is its
/// own root: `org_id` equals its own `id` and `parent_id` is always
/// `None`.
pub async fn create_org(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateOrgRequest>,
) -> Result<Json<Node>, ApiError> {
    require_admin(&principal)?;

    let id = Uuid::new_v4();
    let node = Node {
        id,
        org_id: id,
        parent_id: None,
        kind: NodeKind::Org,
        name: req.name,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };

    let connection = state.db.connection()?;
    let nodes = NodeRepository::new(connection);
    nodes.create_node(&node).await?;
    let created = nodes.get_node(node.id).await?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct CreateChildNodeRequest {
    pub parent_id: Uuid,
    pub kind: NodeKind,
    pub name: String,
}

/// `POST /api/v1/admin/orgs/{org_id}/nodes` — creates a sub-team or team
/// node under `parent_id`, which must already exist within `org_id`.
/// Rejects `kind: org` here — an org can only be created via
/// `POST /api/v1/admin/orgs`.
pub async fn create_node(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(org_id): Path<Uuid>,
    Json(req): Json<CreateChildNodeRequest>,
) -> Result<Json<Node>, ApiError> {
    require_admin(&principal)?;

    if matches!(req.kind, NodeKind::Org) {
        return Err(ApiError::InvalidParent);
    }

    let connection = state.db.connection()?;
    let nodes = NodeRepository::new(connection);

    let parent = nodes.get_node(req.parent_id).await.map_err(|_| ApiError::InvalidParent)?;
    if parent.org_id != org_id {
        return Err(ApiError::InvalidParent);
    }

    let node = Node {
        id: Uuid::new_v4(),
        org_id,
        parent_id: Some(req.parent_id),
        kind: req.kind,
        name: req.name,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };

    nodes.create_node(&node).await?;
    let created = nodes.get_node(node.id).await?;
    Ok(Json(created))
}

#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueOrgAdminTokenRequest {
    pub label: String,
}

/// `POST /api/v1/admin/orgs/{org_id}/tokens` — mints an org-admin opaque
/// token. The wire token is returned exactly once; only its HMAC digest
/// is ever persisted.
pub async fn issue_org_admin_token(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(org_id): Path<Uuid>,
    Json(req): Json<IssueOrgAdminTokenRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    require_admin(&principal)?;
    let Some(pepper) = &state.settings.token_pepper else { return Err(ApiError::InsufficientPermission) };

    let (id, secret) = generate_opaque_token();
    let token_id = Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4());
    let secret_hash = hash_token(pepper, &secret);

    let connection = state.db.connection()?;
    let tokens = TokenRepository::new(connection);
    tokens.create_org_admin_token(token_id, org_id, &req.label, &secret_hash).await?;

    let wire = OpaqueToken { id: token_id.to_string(), secret }.to_wire();
    Ok(Json(IssuedToken { id: token_id, token: wire }))
}

#[derive(Debug, Deserialize)]
pub struct IssueTeamTokenRequest {
    pub label: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// `POST /api/v1/admin/nodes/{node_id}/tokens` — mints a team opaque
/// token scoped to `node_id` with the requested permission set.
pub async fn issue_team_token(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(node_id): Path<Uuid>,
    Json(req): Json<IssueTeamTokenRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    require_admin(&principal)?;
    let Some(pepper) = &state.settings.token_pepper else { return Err(ApiError::InsufficientPermission) };

    let (id, secret) = generate_opaque_token();
    let token_id = Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4());
    let secret_hash = hash_token(pepper, &secret);

    let connection = state.db.connection()?;
    let tokens = TokenRepository::new(connection);
    tokens.create_team_token(token_id, node_id, &req.label, &secret_hash, &req.permissions).await?;

    let wire = OpaqueToken { id: token_id.to_string(), secret }.to_wire();
    Ok(Json(IssuedToken { id: token_id, token: wire }))
}

#[derive(Debug, Deserialize)]
pub struct MintImpersonationTokenRequest {
    #[serde(default = "default_impersonation_ttl")]
    pub ttl_seconds: i64,
}

fn default_impersonation_ttl() -> i64 {
    600
}

#[derive(Debug, Serialize)]
pub struct MintedImpersonationToken {
    pub token: String,
    pub jti: Uuid,
}

/// `POST /api/v1/admin/nodes/{node_id}/impersonation-token` — mints a
/// read-only JWT scoped to `node_id`, usable by the agent runtime on the
/// team's behalf for at most the impersonation TTL ceiling.
pub async fn mint_node_impersonation_token(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(node_id): Path<Uuid>,
    Json(req): Json<MintImpersonationTokenRequest>,
) -> Result<Json<MintedImpersonationToken>, ApiError> {
    require_admin(&principal)?;

    let (token, jti) = mint_impersonation_token(&state.settings.impersonation_jwt_secret, node_id, req.ttl_seconds)?;

    if state.settings.impersonation_jti_db_logging {
        let connection = state.db.connection()?;
        let tokens = TokenRepository::new(connection);
        let expires_at = chrono::Utc::now() + chrono::Duration::seconds(req.ttl_seconds.clamp(1, incidentfox_crypto::IMPERSONATION_MAX_TTL_SECONDS));
        tokens.record_impersonation_jti(jti, node_id, expires_at).await?;
    }

    Ok(Json(MintedImpersonationToken { token, jti }))
}

fn require_admin(principal: &Principal) -> Result<(), ApiError> {
    if principal.has(Permission::AdminWildcard) {
        Ok(())
    } else {
        Err(ApiError::InsufficientPermission)
    }
}
