// [libs/core/crypto/src/dict.rs]
use crate::encryption::{decrypt, encrypt, EncryptionKey};
use crate::error::CryptoError;
use serde_json::Value;

/// Key-name suffixes that mark a JSON string value as a secret. Matching
/// is by suffix so `slack_bot_token` and `github_webhook_url` both land
/// in scope alongside the bare `token`/`webhook_url` names.
const SENSITIVE_KEY_SUFFIXES: &[&str] = &[
    "api_key",
    "secret",
    "password",
    "token",
    "webhook_url",
    "bot_token",
    "client_secret",
];

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEY_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
}

/// Walks a JSON document and encrypts every string value whose key name
/// matches [`SENSITIVE_KEY_SUFFIXES`], recursing into nested objects and
/// arrays so a secret buried in a `metadata` blob is still caught.
///
/// Idempotent: a value already wearing an `encrypt` envelope prefix is
/// left alone rather than double-encrypted, so calling this repeatedly
/// over a config document that's only partially changed is safe.
pub fn encrypt_dict(key: &EncryptionKey, value: &Value) -> Result<Value, CryptoError> {
    transform_dict(value, &mut |field_key, field_value| {
        if !is_sensitive_key(field_key) {
            return Ok(None);
        }
        let Some(plaintext) = field_value.as_str() else {
            return Ok(None);
        };
        if is_already_encrypted(plaintext) {
            return Ok(None);
        }
        Ok(Some(Value::String(encrypt(key, plaintext)?)))
    })
}

/// The inverse of [`encrypt_dict`] — decrypts every sensitive string
/// value it finds, leaving plaintext values (ones that were never
/// encrypted, or already decrypted) untouched.
pub fn decrypt_dict(key: &EncryptionKey, value: &Value) -> Result<Value, CryptoError> {
    transform_dict(value, &mut |field_key, field_value| {
        if !is_sensitive_key(field_key) {
            return Ok(None);
        }
        let Some(ciphertext) = field_value.as_str() else {
            return Ok(None);
        };
        if ciphertext.is_empty() || !is_already_encrypted(ciphertext) {
            return Ok(None);
        }
        Ok(Some(Value::String(decrypt(key, ciphertext)?)))
    })
}

fn is_already_encrypted(value: &str) -> bool {
    value.starts_with("aesgcm:") || value.starts_with("enc:")
}

fn transform_dict(
    value: &Value,
    transform: &mut dyn FnMut(&str, &Value) -> Result<Option<Value>, CryptoError>,
) -> Result<Value, CryptoError> {
    match value {
        Value::Object(map) => {
            let mut result = serde_json::Map::with_capacity(map.len());
            for (key, field_value) in map {
                let transformed = transform(key, field_value)?;
                let next = match transformed {
                    Some(v) => v,
                    None => transform_dict(field_value, transform)?,
                };
                result.insert(key.clone(), next);
            }
            Ok(Value::Object(result))
        }
        Value::Array(items) => {
            let mut result = Vec::with_capacity(items.len());
            for item in items {
                result.push(transform_dict(item, transform)?);
            }
            Ok(Value::Array(result))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encrypts_only_sensitive_leaf_values() {
        let key = EncryptionKey::generate();
        let doc = json!({
            "channel_id": "C123",
            "bot_token": "xoxb-secret",
            "metadata": {"client_secret": "nested-secret"},
        });
        let encrypted = encrypt_dict(&key, &doc).unwrap();
        assert_eq!(encrypted["channel_id"], json!("C123"));
        assert!(encrypted["bot_token"].as_str().unwrap().starts_with("aesgcm:"));
        assert!(encrypted["metadata"]["client_secret"].as_str().unwrap().starts_with("aesgcm:"));
    }

    #[test]
    fn encrypt_dict_is_idempotent() {
        let key = EncryptionKey::generate();
        let doc = json!({"bot_token": "xoxb-secret"});
        let once = encrypt_dict(&key, &doc).unwrap();
        let twice = encrypt_dict(&key, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn decrypt_dict_round_trips_encrypt_dict() {
        let key = EncryptionKey::generate();
        let doc = json!({"bot_token": "xoxb-secret", "channel_id": "C123"});
        let encrypted = encrypt_dict(&key, &doc).unwrap();
        let decrypted = decrypt_dict(&key, &encrypted).unwrap();
        assert_eq!(decrypted, doc);
    }
}
