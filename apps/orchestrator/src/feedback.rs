// [apps/orchestrator/src/feedback.rs]
use crate::state::AppState;
use incidentfox_db::{AuditRepository, RunRepository};
use incidentfox_domain::FeedbackSignal;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use tracing::warn;
use uuid::Uuid;

fn run_id_marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<!--\s*incidentfox:run_id=([a-zA-Z0-9-]+)\s*-->").expect("run id marker pattern is valid"))
}

/// Pulls the hidden `run_id` marker out of a posted GitHub comment body, if
/// present. A fresh comment carries no marker; a comment this service
/// itself posted does, so a later reaction on it can be matched back to
/// the run that produced it.
pub fn extract_run_id_marker(comment_body: &str) -> Option<Uuid> {
    let captures = run_id_marker_pattern().captures(comment_body)?;
    Uuid::parse_str(&captures[1]).ok()
}

pub fn run_id_marker(run_id: Uuid) -> String {
    format!("<!-- incidentfox:run_id={run_id} -->")
}

#[derive(Debug, Deserialize)]
struct Reaction {
    content: String,
    user: ReactionUser,
}

#[derive(Debug, Deserialize, Default)]
struct ReactionUser {
    #[serde(default)]
    login: String,
}

/// Polls the reactions on a GitHub comment this service posted and records
/// the first thumbs up/down it finds as feedback on the originating run.
/// `github_token` is the same installation token used to post the comment
/// in the first place.
pub async fn poll_github_reactions(state: &AppState, run_id: Uuid, repo_full_name: &str, comment_id: u64, github_token: &str) {
    let url = format!("https://api.github.com/repos/{repo_full_name}/issues/comments/{comment_id}/reactions");
    let response = state
        .http
        .get(&url)
        .bearer_auth(github_token)
        .header("Accept", "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28")
        .send()
        .await;

    let reactions: Vec<Reaction> = match response {
        Ok(resp) if resp.status().is_success() => match resp.json().await {
            Ok(reactions) => reactions,
            Err(e) => {
                warn!(%run_id, comment_id, error = %e, "could not parse github reactions response");
                return;
            }
        },
        Ok(resp) => {
            warn!(%run_id, comment_id, status = %resp.status(), "github reactions fetch returned a non-success status");
            return;
        }
        Err(e) => {
            warn!(%run_id, comment_id, error = %e, "github reactions fetch failed");
            return;
        }
    };

    for reaction in reactions {
        let feedback = match reaction.content.as_str() {
            "+1" => FeedbackSignal::Positive,
            "-1" => FeedbackSignal::Negative,
            _ => continue,
        };
        if let Err(e) = record_feedback(state, run_id, feedback, &reaction.user.login).await {
            warn!(%run_id, error = %e, "failed to record github reaction feedback");
        }
    }
}

async fn record_feedback(state: &AppState, run_id: Uuid, feedback: FeedbackSignal, user_login: &str) -> Result<(), incidentfox_db::DbError> {
    let runs = RunRepository::new(state.db.connection()?);
    runs.record_feedback(run_id, feedback).await?;

    let audit = AuditRepository::new(state.db.connection()?);
    audit
        .record(
            Uuid::new_v4(),
            None,
            Some(run_id),
            "github",
            "agent_run.feedback_recorded",
            &json!({ "feedback": feedback, "user_login": user_login }),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_run_id_from_comment_body() {
        let id = Uuid::new_v4();
        let body = format!("Here is the triage summary.\n\n<!-- incidentfox:run_id={id} -->");
        assert_eq!(extract_run_id_marker(&body), Some(id));
    }

    #[test]
    fn returns_none_for_comment_without_marker() {
        assert_eq!(extract_run_id_marker("just a regular comment"), None);
    }

    #[test]
    fn ignores_malformed_marker() {
        assert_eq!(extract_run_id_marker("<!-- incidentfox:run_id=not-a-uuid -->"), None);
    }
}
