// [apps/config-service/src/handlers/config.rs]
use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use incidentfox_crypto::{decrypt_dict, encrypt_dict, EncryptionKey};
use incidentfox_db::NodeRepository;
use incidentfox_domain::{NodeConfig, Permission, Principal};
use serde_json::Value;
use uuid::Uuid;

/// `GET /api/v1/auth/me` — tells the caller how they authenticated and
/// what they're scoped to, so clients don't have to guess their own
/// permission set from a token shape.
pub async fn get_auth_me(Extension(principal): Extension<Principal>) -> Json<Value> {
    Json(serde_json::json!({
        "auth_kind": principal.auth_kind,
        "org_id": principal.org_id,
        "node_id": principal.node_id,
        "permissions": principal.permissions.iter().map(Permission::as_str).collect::<Vec<_>>(),
        "can_write": principal.can_write(),
    }))
}

/// `GET /api/v1/config/me/effective` — the caller's own effective config,
/// resolved by folding its ancestor chain. Integration secrets are
/// decrypted at this boundary so callers never see ciphertext.
pub async fn get_my_effective_config(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    let node_id = principal.node_id.ok_or(ApiError::InsufficientPermission)?;
    if !principal.has(Permission::TeamRead) {
        return Err(ApiError::InsufficientPermission);
    }

    let connection = state.db.connection()?;
    let nodes = NodeRepository::new(connection);
    let effective = nodes.get_effective_config(node_id).await?;

    let key = EncryptionKey::from_base64(&state.settings.encryption_key)?;
    let decrypted = decrypt_dict(&key, &effective.data)?;
    Ok(Json(serde_json::json!({ "node_id": effective.node_id, "data": decrypted })))
}

/// `PATCH /api/v1/admin/nodes/{node_id}/config` — merges `patch` into the
/// node's own config document. Immutable keys are enforced before the
/// merge ever reaches the repository; sensitive fields in the patch are
/// encrypted before they touch storage.
pub async fn patch_node_config(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(node_id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<NodeConfig>, ApiError> {
    authorize_write(&principal, node_id)?;
    let updated = apply_patch(&state, node_id, &patch).await?;
    Ok(Json(updated))
}

/// `PUT /api/v1/config/me` — the self-service counterpart of
/// `patch_node_config`: merges `patch` into the caller's own node rather
/// than one named in the path. Gated the same way, so an impersonation
/// principal (never `can_write()`) is rejected with `insufficient_permission`
/// before the patch is even validated.
pub async fn update_my_config(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(patch): Json<Value>,
) -> Result<Json<NodeConfig>, ApiError> {
    let node_id = principal.node_id.ok_or(ApiError::InsufficientPermission)?;
    authorize_write(&principal, node_id)?;
    let updated = apply_patch(&state, node_id, &patch).await?;
    Ok(Json(updated))
}

async fn apply_patch(state: &AppState, node_id: Uuid, patch: &Value) -> Result<NodeConfig, ApiError> {
    let connection = state.db.connection()?;
    let nodes = NodeRepository::new(connection);

    let current = nodes.get_config(node_id).await?;
    current.validate_patch(patch)?;

    let key = EncryptionKey::from_base64(&state.settings.encryption_key)?;
    let encrypted_patch = encrypt_dict(&key, patch)?;

    Ok(nodes.patch_config(node_id, &encrypted_patch).await?)
}

/// `GET /api/v1/admin/nodes/{node_id}/config/effective` — same resolution
/// as the caller's own effective-config endpoint, but for any node an
/// admin or org-admin principal names explicitly.
pub async fn get_node_effective_config(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(node_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !principal.has(Permission::AdminWildcard) {
        return Err(ApiError::InsufficientPermission);
    }

    let connection = state.db.connection()?;
    let nodes = NodeRepository::new(connection);
    let effective = nodes.get_effective_config(node_id).await?;

    let key = EncryptionKey::from_base64(&state.settings.encryption_key)?;
    let decrypted = decrypt_dict(&key, &effective.data)?;
    Ok(Json(serde_json::json!({ "node_id": effective.node_id, "data": decrypted })))
}

/// A principal may write its own node via `team:write`, or any node at
/// all via the admin wildcard. Impersonation never satisfies either
/// path — [`Principal::can_write`] already excludes it — but an admin
/// wildcard holder isn't gated on `can_write()` since that check is
/// specific to the team-write case.
fn authorize_write(principal: &Principal, node_id: Uuid) -> Result<(), ApiError> {
    if principal.has(Permission::AdminWildcard) {
        return Ok(());
    }
    if principal.can_write() && principal.node_id == Some(node_id) {
        return Ok(());
    }
    Err(ApiError::InsufficientPermission)
}
