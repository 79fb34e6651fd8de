//! Response normalization
//!
//! Every non-binary call returns the same JSON envelope:
//!
//! ```json
//! { "model": { "result": ... }, "errors": [], "messages": [] }
//! ```
//!
//! [`normalize`] turns whatever happened on the wire (a body, a transport failure, a
//! cancellation) into one [`CallOutcome`]. It never retries and never fails.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::types::{CallOutcome, non_empty};

/// The server's uniform response wrapper
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Envelope {
    /// Payload, either directly or wrapped under `result`
    #[serde(default)]
    pub model: Value,
    /// Error strings
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<String>,
    /// Informational messages
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<String>,
}

impl Envelope {
    /// Extract the payload
    ///
    /// `model.result` wins when the key is present and not null, including falsy values such as
    /// `0`, `""` or `[]`. A `null` result or a `null` model means no payload. Otherwise the
    /// model itself is the payload.
    pub fn into_result(self) -> Option<Value> {
        match self.model {
            Value::Null => None,
            Value::Object(mut model) if model.contains_key("result") => {
                match model.remove("result") {
                    Some(Value::Null) | None => None,
                    Some(result) => Some(result),
                }
            }
            model => Some(model),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// What happened on the wire for one request
#[derive(Clone, Debug, PartialEq)]
pub enum Exchange {
    /// The server answered
    Completed {
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },
    /// The request never completed (connection refused, timeout, broken body, ...)
    Failed(String),
    /// The request was aborted locally
    Cancelled,
}

/// Turn one exchange into a [`CallOutcome`]
pub fn normalize(
    call: &str,
    item_id: Option<String>,
    exchange: Exchange,
    diagnostics: &Diagnostics,
) -> CallOutcome {
    match exchange {
        Exchange::Completed { status, body } if (200..300).contains(&status) => {
            match serde_json::from_str::<Envelope>(&body) {
                Ok(envelope) => from_envelope(call, item_id, envelope),
                Err(e) => {
                    diagnostics.emit_with(|| format!("{}: malformed response: {}", call, e));
                    CallOutcome::failure(call, item_id, format!("{}: {}", e, body))
                }
            }
        }
        Exchange::Completed { status, body } => {
            // Application errors often come back with a 4xx/5xx status and a proper envelope
            if let Ok(envelope) = serde_json::from_str::<Envelope>(&body)
                && !envelope.errors.is_empty()
            {
                return CallOutcome {
                    result: None,
                    errors: non_empty(envelope.errors),
                    messages: non_empty(envelope.messages),
                    call: call.to_string(),
                    item_id,
                };
            }
            CallOutcome::failure(call, item_id, format!("failed: HTTP {}", status_text(status)))
        }
        Exchange::Failed(reason) => CallOutcome::failure(call, item_id, format!("failed: {}", reason)),
        Exchange::Cancelled => CallOutcome::failure(call, item_id, "cancelled"),
    }
}

fn from_envelope(call: &str, item_id: Option<String>, envelope: Envelope) -> CallOutcome {
    let errors = non_empty(envelope.errors.clone());
    let messages = non_empty(envelope.messages.clone());
    CallOutcome {
        result: envelope.into_result(),
        errors,
        messages,
        call: call.to_string(),
        item_id,
    }
}

fn status_text(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("{} {}", status, reason),
        None => status.to_string(),
    }
}
