// [apps/credential-proxy/src/credentials.rs]
use crate::errors::ProxyError;
use crate::providers::{missing_required_fields, ProviderSpec};
use incidentfox_crypto::{decrypt_dict, EncryptionKey};
use incidentfox_db::NodeRepository;
use incidentfox_db::DbClient;
use serde_json::Value;
use uuid::Uuid;

/// Resolves `spec`'s integration config for `node_id`: folds the node's
/// ancestor chain into an effective config, decrypts it, and pulls out
/// `integrations.<integration_id>`. The URL's routing data never factors
/// in here — `node_id` comes only from the verified sandbox JWT.
pub async fn resolve(db: &DbClient, node_id: Uuid, spec: &ProviderSpec, encryption_key: &str) -> Result<Value, ProxyError> {
    let connection = db.connection()?;
    let nodes = NodeRepository::new(connection);
    let effective = nodes.get_effective_config(node_id).await?;

    let key = EncryptionKey::from_base64(encryption_key)?;
    let decrypted = decrypt_dict(&key, &effective.data)?;

    let config = decrypted.get("integrations").and_then(|integrations| integrations.get(spec.integration_id)).cloned();

    match config {
        Some(config) => {
            let missing = missing_required_fields(spec, &config);
            if missing.is_empty() {
                Ok(config)
            } else {
                Err(ProxyError::IntegrationNotConfigured { integration_id: spec.integration_id.to_string(), missing_fields: missing })
            }
        }
        None => Err(ProxyError::IntegrationNotConfigured {
            integration_id: spec.integration_id.to_string(),
            missing_fields: spec.required_fields.iter().map(|f| f.to_string()).collect(),
        }),
    }
}
