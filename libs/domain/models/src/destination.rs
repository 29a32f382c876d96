// [libs/domain/models/src/destination.rs]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    Slack,
    GitHubPr,
    GitHubIssue,
    PagerDuty,
    IncidentIo,
}

/// A place the orchestrator can post a result: a Slack channel, a GitHub
/// PR/issue comment thread, or an external output endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    SlackChannel { channel_id: String },
    GitHubThread { owner: String, repo: String, number: u64 },
    WebhookUrl { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOverride {
    ReplyInThread,
    CommentOnPr,
    UseDefault,
}

/// The `output_config` block of a node's effective config, plus the
/// legacy `notifications.default_slack_channel_id` field it can fall
/// back to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub default_destinations: Vec<Destination>,
    #[serde(default)]
    pub trigger_overrides: std::collections::HashMap<TriggerSource, TriggerOverride>,
    #[serde(default)]
    pub per_source_slack_channel: std::collections::HashMap<TriggerSource, String>,
    pub legacy_default_slack_channel_id: Option<String>,
}

/// Resolves where a run's result should be posted, given the trigger that
/// started it and the current trigger context (the Slack thread or GitHub
/// PR/issue the trigger arrived on, when one exists).
///
/// Precedence, read top to bottom — the first rule that produces a
/// destination wins:
/// 1. `explicit_override`, if the caller supplied one → returned verbatim,
///    skipping every rule below.
/// 2. `trigger_overrides[source] == use_default` → `default_destinations`,
///    skipping every per-source rule below.
/// 3. an explicit per-source override (`reply_in_thread`,
///    `comment_on_pr`) → the trigger's own thread/PR, returned without
///    consulting `default_destinations` at all.
/// 4. for `pagerduty`/`incidentio`, `per_source_slack_channel[source]`.
/// 5. `default_destinations`, if non-empty.
/// 6. `legacy_default_slack_channel_id`, if set.
/// 7. nothing.
pub fn resolve_destinations(
    config: &OutputConfig,
    source: TriggerSource,
    trigger_thread: Option<Destination>,
    explicit_override: Option<Vec<Destination>>,
) -> Vec<Destination> {
    if let Some(destinations) = explicit_override {
        return destinations;
    }

    if let Some(TriggerOverride::UseDefault) = config.trigger_overrides.get(&source) {
        return config.default_destinations.clone();
    }

    match config.trigger_overrides.get(&source) {
        Some(TriggerOverride::ReplyInThread) | Some(TriggerOverride::CommentOnPr) => {
            if let Some(thread) = trigger_thread {
                return vec![thread];
            }
        }
        None => {}
        _ => {}
    }

    if matches!(source, TriggerSource::PagerDuty | TriggerSource::IncidentIo) {
        if let Some(channel_id) = config.per_source_slack_channel.get(&source) {
            return vec![Destination::SlackChannel { channel_id: channel_id.clone() }];
        }
    }

    if !config.default_destinations.is_empty() {
        return config.default_destinations.clone();
    }

    if let Some(channel_id) = &config.legacy_default_slack_channel_id {
        return vec![Destination::SlackChannel { channel_id: channel_id.clone() }];
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slack(id: &str) -> Destination {
        Destination::SlackChannel { channel_id: id.to_string() }
    }

    #[test]
    fn use_default_override_skips_per_source_rules() {
        let mut config = OutputConfig::default();
        config.default_destinations = vec![slack("C_DEFAULT")];
        config.trigger_overrides.insert(TriggerSource::PagerDuty, TriggerOverride::UseDefault);
        config.per_source_slack_channel.insert(TriggerSource::PagerDuty, "C_PD".to_string());

        let resolved = resolve_destinations(&config, TriggerSource::PagerDuty, None, None);
        assert_eq!(resolved, vec![slack("C_DEFAULT")]);
    }

    #[test]
    fn per_source_trigger_override_returns_trigger_thread_without_default() {
        let mut config = OutputConfig::default();
        config.default_destinations = vec![slack("C_DEFAULT")];
        config.trigger_overrides.insert(TriggerSource::GitHubPr, TriggerOverride::CommentOnPr);
        let thread = Destination::GitHubThread { owner: "acme".into(), repo: "web".into(), number: 42 };

        let resolved = resolve_destinations(&config, TriggerSource::GitHubPr, Some(thread.clone()), None);
        assert_eq!(resolved, vec![thread]);
    }

    #[test]
    fn explicit_override_wins_over_everything_else() {
        let mut config = OutputConfig::default();
        config.default_destinations = vec![slack("C_DEFAULT")];
        config.trigger_overrides.insert(TriggerSource::GitHubPr, TriggerOverride::CommentOnPr);
        let thread = Destination::GitHubThread { owner: "acme".into(), repo: "web".into(), number: 42 };
        let forced = vec![slack("C_FORCED")];

        let resolved = resolve_destinations(&config, TriggerSource::GitHubPr, Some(thread), Some(forced.clone()));
        assert_eq!(resolved, forced);
    }

    #[test]
    fn new_default_destinations_beat_legacy_slack_channel() {
        let mut config = OutputConfig::default();
        config.default_destinations = vec![slack("C_NEW")];
        config.legacy_default_slack_channel_id = Some("C_LEGACY".to_string());

        let resolved = resolve_destinations(&config, TriggerSource::Slack, None, None);
        assert_eq!(resolved, vec![slack("C_NEW")]);
    }

    #[test]
    fn legacy_slack_channel_is_the_final_fallback() {
        let mut config = OutputConfig::default();
        config.legacy_default_slack_channel_id = Some("C_LEGACY".to_string());

        let resolved = resolve_destinations(&config, TriggerSource::Slack, None, None);
        assert_eq!(resolved, vec![slack("C_LEGACY")]);
    }

    #[test]
    fn no_rule_matching_yields_empty() {
        let config = OutputConfig::default();
        let resolved = resolve_destinations(&config, TriggerSource::Slack, None, None);
        assert!(resolved.is_empty());
    }
}
