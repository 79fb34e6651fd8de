//! Store edits: participants, transcript removal and uploads.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::client::{Method, StoreClient, TranscriptUpload};
use crate::params::{ParamValue, Parameters};
use crate::types::CallOutcome;

use super::StoreRead;

/// Edits against the edit-store endpoint (`api/edit/store/`) plus transcript uploads
#[async_trait]
pub trait StoreEdit: StoreRead {
    /// Create or update a participant
    ///
    /// `attributes` maps participant attribute layer ids to their new values.
    async fn save_participant(
        &self,
        participant_id: &str,
        label: &str,
        attributes: &Map<String, Value>,
    ) -> CallOutcome<bool> {
        let mut params = Parameters::new()
            .with("id", participant_id)
            .with("label", label);
        for (key, value) in attributes {
            params.push(key.as_str(), attribute_value(value));
        }
        edit(self.core(), "saveParticipant", params).await.decode()
    }

    /// Delete a transcript and its media
    async fn delete_transcript(&self, transcript_id: &str) -> CallOutcome {
        tracing::info!(transcript_id, "deleting transcript");
        edit(
            self.core(),
            "deleteTranscript",
            Parameters::new().with("id", transcript_id),
        )
        .await
    }

    /// Delete a participant
    async fn delete_participant(&self, participant_id: &str) -> CallOutcome {
        tracing::info!(participant_id, "deleting participant");
        edit(
            self.core(),
            "deleteParticipant",
            Parameters::new().with("id", participant_id),
        )
        .await
    }

    /// Upload a new transcript with its media
    ///
    /// The result maps the transcript name to the id of the server task that processes it.
    async fn new_transcript(&self, upload: &TranscriptUpload) -> CallOutcome {
        self.core()
            .upload_transcript("newTranscript", "new", upload)
            .await
    }

    /// Replace an existing transcript's annotations with an uploaded file
    async fn update_transcript(&self, upload: &TranscriptUpload) -> CallOutcome {
        self.core()
            .upload_transcript("updateTranscript", "update", upload)
            .await
    }
}

async fn edit(core: &StoreClient, call: &str, params: Parameters) -> CallOutcome {
    let url = format!("{}{}", core.config().edit_store_url(), call);
    core.issue(call, &params, Some(&url), Method::Post).await
}

fn attribute_value(value: &Value) -> ParamValue {
    match value {
        Value::String(s) => ParamValue::Text(s.clone()),
        Value::Number(n) => n
            .as_f64()
            .map(ParamValue::Number)
            .unwrap_or_else(|| ParamValue::Text(n.to_string())),
        Value::Bool(b) => ParamValue::Text(b.to_string()),
        Value::Array(items) => ParamValue::List(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        Value::Null => ParamValue::Text(String::new()),
        Value::Object(_) => ParamValue::Text(value.to_string()),
    }
}
