//! Pattern search and result retrieval.

use serde_json::Value;

use crate::params::Parameters;
use crate::types::{CallOutcome, Match};

use super::{Method, StoreClient};

/// Restrictions applied to a search
#[derive(Clone, Debug, Default)]
pub struct SearchOptions {
    /// Only search these participants (empty = all)
    pub participant_ids: Vec<String>,
    /// Only search these transcript types (empty = all)
    pub transcript_types: Vec<String>,
    /// Only match utterances of each transcript's main participant
    pub main_participant_only: bool,
    /// Only match aligned words
    pub aligned_only: bool,
    /// Cap on matches per transcript
    pub matches_per_transcript: Option<u32>,
    /// Minimum overlap percentage for simultaneous speech
    pub overlap_threshold: Option<u32>,
}

impl StoreClient {
    /// Start a search; the result is the id of the server task running it
    ///
    /// Wait for the task with [`wait_for_task`](Self::wait_for_task), then fetch rows with
    /// [`get_matches`](Self::get_matches) and finally [`release_task`](Self::release_task).
    pub async fn search(&self, pattern: &Value, options: &SearchOptions) -> CallOutcome<String> {
        let params = Parameters::new()
            .with("searchJson", pattern.to_string())
            .with("participant_id", options.participant_ids.clone())
            .with("transcript_type", options.transcript_types.clone())
            .with("only_main_speaker", options.main_participant_only)
            .with("only_aligned", options.aligned_only)
            .with_opt("matches_per_transcript", options.matches_per_transcript)
            .with_opt("overlap_threshold", options.overlap_threshold);

        let outcome = self
            .issue("search", &params, Some(&self.config.url("api/search")), Method::Get)
            .await;
        let mut task = outcome.map(|result| match result {
            Value::Object(model) => model.get("threadId").map(id_text),
            other => Some(id_text(&other)),
        });
        let task_id = task.result.take().flatten();
        if task_id.is_none() && task.is_ok() {
            task.push_error("search did not return a task id");
        }
        CallOutcome {
            result: task_id,
            errors: task.errors,
            messages: task.messages,
            call: task.call,
            item_id: task.item_id,
        }
    }

    /// Rows found by a finished search task
    ///
    /// `words_context` is the number of words of context to include either side of each match.
    pub async fn get_matches(&self, task_id: &str, words_context: Option<u32>) -> CallOutcome<Vec<Match>> {
        let params = Parameters::new()
            .with("threadId", task_id)
            .with_opt("words_context", words_context);
        self.issue("getMatches", &params, Some(&self.config.url("api/results")), Method::Get)
            .await
            .map(|result| match result {
                Value::Object(mut model) if model.contains_key("matches") => {
                    model.remove("matches").unwrap_or(Value::Null)
                }
                other => other,
            })
            .decode()
    }
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
