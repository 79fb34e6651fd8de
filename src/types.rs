//! Core types for labbcat

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::match_id::MatchId;

/// The settled outcome of one call against the store
///
/// Every request produces exactly one of these, whether it succeeded, failed in transport,
/// returned a malformed body, or was cancelled. `errors` and `messages` are never empty
/// vectors: an empty list from the server is collapsed to `None`, so `errors.is_none()` is
/// the success test.
///
/// `result` is present/absent explicitly: a server payload of `0`, `""` or `[]` is `Some`.
#[derive(Clone, Debug, PartialEq)]
pub struct CallOutcome<T = Value> {
    /// Payload, if the call produced one
    pub result: Option<T>,
    /// Error strings, verbatim from the server or synthesized locally
    pub errors: Option<Vec<String>>,
    /// Informational messages from the server
    pub messages: Option<Vec<String>>,
    /// Name of the call that produced this outcome
    pub call: String,
    /// The `id` parameter of the call, if one was sent
    pub item_id: Option<String>,
}

impl<T> CallOutcome<T> {
    /// A successful outcome carrying `result`
    pub fn success(call: impl Into<String>, item_id: Option<String>, result: T) -> Self {
        Self {
            result: Some(result),
            errors: None,
            messages: None,
            call: call.into(),
            item_id,
        }
    }

    /// A failed outcome with a single error and no result
    pub fn failure(
        call: impl Into<String>,
        item_id: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            result: None,
            errors: Some(vec![error.into()]),
            messages: None,
            call: call.into(),
            item_id,
        }
    }

    /// True when no errors were reported
    pub fn is_ok(&self) -> bool {
        self.errors.is_none()
    }

    /// First reported error, if any
    pub fn first_error(&self) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(String::as_str)
    }

    /// Transform the payload, keeping errors, messages and call identity
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallOutcome<U> {
        CallOutcome {
            result: self.result.map(f),
            errors: self.errors,
            messages: self.messages,
            call: self.call,
            item_id: self.item_id,
        }
    }

    /// Convert into a `Result`, failing when any error was reported
    pub fn into_result(self) -> std::result::Result<Option<T>, Vec<String>> {
        match self.errors {
            Some(errors) => Err(errors),
            None => Ok(self.result),
        }
    }

    /// Append an error, keeping the never-empty invariant
    pub(crate) fn push_error(&mut self, error: impl Into<String>) {
        self.errors.get_or_insert_with(Vec::new).push(error.into());
    }
}

impl CallOutcome<Value> {
    /// Deserialize the JSON payload into `U`
    ///
    /// A payload that does not fit `U` becomes an error outcome with no result.
    pub fn decode<U: DeserializeOwned>(self) -> CallOutcome<U> {
        let CallOutcome {
            result,
            errors,
            messages,
            call,
            item_id,
        } = self;
        let mut decoded = CallOutcome {
            result: None,
            errors,
            messages,
            call,
            item_id,
        };
        if let Some(value) = result {
            match serde_json::from_value::<U>(value) {
                Ok(typed) => decoded.result = Some(typed),
                Err(e) => {
                    let error = format!("failed to decode {} result: {}", decoded.call, e);
                    decoded.push_error(error);
                }
            }
        }
        decoded
    }
}

/// Collapse an empty list to `None`
pub(crate) fn non_empty(list: Vec<String>) -> Option<Vec<String>> {
    if list.is_empty() { None } else { Some(list) }
}

/// Status of a long-running server task
///
/// The server owns this state; a client only ever holds a snapshot fetched by
/// [`task_status`](crate::StoreClient::task_status).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// Task identifier
    #[serde(default, deserialize_with = "string_or_number")]
    pub thread_id: String,
    /// Whether the task is still running
    #[serde(default)]
    pub running: bool,
    /// Progress, 0-100
    #[serde(default)]
    pub percent_complete: f64,
    /// Poll interval the server suggests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_seconds: Option<f64>,
    /// Human-readable status line
    #[serde(default)]
    pub status: String,
    /// Task name
    #[serde(default)]
    pub thread_name: String,
    /// Any further fields the server reports (result URLs, series ids, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl TaskStatus {
    /// How long to wait before the next status check
    ///
    /// Uses the server's `refreshSeconds` when it is a positive number, else `fallback`.
    pub fn refresh_interval(&self, fallback: Duration) -> Duration {
        match self.refresh_seconds {
            Some(secs) if secs.is_finite() && secs > 0.0 => Duration::from_secs_f64(secs),
            _ => fallback,
        }
    }
}

/// One search result row
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Compound match identifier, see [`MatchId`]
    #[serde(rename = "MatchId")]
    pub match_id: String,
    /// Transcript the match is in
    #[serde(rename = "Transcript")]
    pub transcript: String,
    /// Speaker of the matched utterance
    #[serde(rename = "Participant", default)]
    pub participant: String,
    /// Corpus of the transcript
    #[serde(rename = "Corpus", default)]
    pub corpus: String,
    /// Utterance start, in seconds
    #[serde(rename = "Line")]
    pub line: f64,
    /// Utterance end, in seconds
    #[serde(rename = "LineEnd")]
    pub line_end: f64,
    /// Context before the match
    #[serde(rename = "BeforeMatch", default)]
    pub before_match: String,
    /// Matched text
    #[serde(rename = "Text", default)]
    pub text: String,
    /// Context after the match
    #[serde(rename = "AfterMatch", default)]
    pub after_match: String,
}

impl Match {
    /// Parse this row's match identifier
    pub fn id(&self) -> MatchId {
        MatchId::parse(&self.match_id)
    }
}

/// Accept ids sent either as JSON strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
