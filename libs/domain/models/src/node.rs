// [libs/domain/models/src/node.rs]
use crate::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Config keys that may never change value once a node has one, including
/// being reset to the value it already holds.
pub const IMMUTABLE_KEYS: &[&str] = &["team_name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Org,
    SubTeam,
    Team,
}

/// One node in the org → sub_team → team tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: Uuid,
    pub org_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub kind: NodeKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A node's own config document, versioned on every write. `data` is kept
/// as a raw JSON object rather than a closed struct because the schema is
/// open (`extra="allow"` semantics) — unrecognized top-level keys survive
/// round trips untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_id: Uuid,
    pub version: u32,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

impl NodeConfig {
    pub fn empty(node_id: Uuid) -> Self {
        Self {
            node_id,
            version: 0,
            data: Value::Object(Map::new()),
            updated_at: Utc::now(),
        }
    }

    /// Validates a proposed patch against the immutable-key list. A patch
    /// may omit an immutable key, but if present its value must equal the
    /// value already on record — even re-asserting the same value is
    /// rejected, matching the "never touch it again" contract callers
    /// expect from `team_name`.
    pub fn validate_patch(&self, patch: &Value) -> Result<(), DomainError> {
        let Some(patch_obj) = patch.as_object() else {
            return Ok(());
        };
        let current_obj = self.data.as_object();
        for key in IMMUTABLE_KEYS {
            if patch_obj.contains_key(*key) {
                let had_value = current_obj.and_then(|o| o.get(*key)).is_some();
                if had_value {
                    return Err(DomainError::ImmutableField((*key).to_string()));
                }
            }
        }
        Ok(())
    }
}

/// The result of walking a node's ancestor chain and deep-merging each
/// config document from the org root down to the node itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub node_id: Uuid,
    pub data: Value,
}

impl EffectiveConfig {
    /// Merges a chain of configs ordered from the root ancestor to the
    /// node itself. Each step folds the next config over the accumulator
    /// with [`deep_merge`].
    pub fn resolve(node_id: Uuid, chain: &[Value]) -> Self {
        let merged = chain
            .iter()
            .fold(Value::Object(Map::new()), |acc, overlay| deep_merge(&acc, overlay));
        Self { node_id, data: merged }
    }
}

/// Deep-merges `overlay` onto `base`.
///
/// - object ⊕ object recurses key by key.
/// - a `null` in `overlay` deletes the key from the result entirely.
/// - any other overlay value (list, scalar, or a differently-typed value
///   than what `base` holds at that key) replaces the base value whole —
///   lists are never concatenated or index-merged.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                    continue;
                }
                match result.get(key) {
                    Some(existing) => {
                        result.insert(key.clone(), deep_merge(existing, overlay_value));
                    }
                    None => {
                        result.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
            Value::Object(result)
        }
        _ => overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_recurses_into_nested_objects() {
        let base = json!({"agents": {"investigation_agent": {"enabled": true, "prompt": "a"}}});
        let overlay = json!({"agents": {"investigation_agent": {"prompt": "b"}}});
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["agents"]["investigation_agent"]["enabled"], json!(true));
        assert_eq!(merged["agents"]["investigation_agent"]["prompt"], json!("b"));
    }

    #[test]
    fn merge_replaces_lists_instead_of_concatenating() {
        let base = json!({"alerts": {"disabled": ["a", "b"]}});
        let overlay = json!({"alerts": {"disabled": ["c"]}});
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["alerts"]["disabled"], json!(["c"]));
    }

    #[test]
    fn null_in_overlay_deletes_key() {
        let base = json!({"routing": {"slack_channel_id": "C123"}});
        let overlay = json!({"routing": {"slack_channel_id": null}});
        let merged = deep_merge(&base, &overlay);
        assert!(merged["routing"].as_object().unwrap().get("slack_channel_id").is_none());
    }

    #[test]
    fn effective_config_folds_ancestor_chain_in_order() {
        let org = json!({"notifications": {"default_slack_channel_id": "C_ORG"}});
        let sub_team = json!({});
        let team = json!({"notifications": {"default_slack_channel_id": "C_TEAM"}});
        let node_id = Uuid::new_v4();
        let effective = EffectiveConfig::resolve(node_id, &[org, sub_team, team]);
        assert_eq!(effective.data["notifications"]["default_slack_channel_id"], json!("C_TEAM"));
    }

    #[test]
    fn immutable_team_name_rejects_any_patch_including_same_value() {
        let mut cfg = NodeConfig::empty(Uuid::new_v4());
        cfg.data = json!({"team_name": "payments"});
        let same_value_patch = json!({"team_name": "payments"});
        assert!(cfg.validate_patch(&same_value_patch).is_err());
        let unrelated_patch = json!({"slack_group_to_ping": "@oncall"});
        assert!(cfg.validate_patch(&unrelated_patch).is_ok());
    }
}
