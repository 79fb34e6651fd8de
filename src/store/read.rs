//! Read-only store queries.

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Method, StoreClient};
use crate::params::Parameters;
use crate::types::CallOutcome;

/// Read-only queries against the store endpoint (`api/store/`)
///
/// Every method is one GET request whose outcome is returned as-is; object-shaped payloads
/// (layers, participants, annotations) stay as JSON, while ids, counts and URLs are decoded.
#[async_trait]
pub trait StoreRead: Send + Sync {
    /// The client requests are issued through
    fn core(&self) -> &StoreClient;

    /// Identifier of the store
    async fn get_id(&self) -> CallOutcome<String> {
        query(self.core(), "getId", Parameters::new()).await.decode()
    }

    /// Ids of every annotation layer
    async fn get_layer_ids(&self) -> CallOutcome<Vec<String>> {
        query(self.core(), "getLayerIds", Parameters::new())
            .await
            .decode()
    }

    /// Definitions of every annotation layer
    async fn get_layers(&self) -> CallOutcome<Vec<Value>> {
        query(self.core(), "getLayers", Parameters::new())
            .await
            .decode()
    }

    /// Definition of one layer
    async fn get_layer(&self, layer_id: &str) -> CallOutcome {
        query(self.core(), "getLayer", Parameters::new().with("id", layer_id)).await
    }

    /// Ids of every corpus
    async fn get_corpus_ids(&self) -> CallOutcome<Vec<String>> {
        query(self.core(), "getCorpusIds", Parameters::new())
            .await
            .decode()
    }

    /// Ids of every participant
    async fn get_participant_ids(&self) -> CallOutcome<Vec<String>> {
        query(self.core(), "getParticipantIds", Parameters::new())
            .await
            .decode()
    }

    /// A participant, with annotations on the given participant layers
    async fn get_participant(&self, participant_id: &str, layer_ids: &[String]) -> CallOutcome {
        let params = Parameters::new()
            .with("id", participant_id)
            .with("layerIds", layer_ids);
        query(self.core(), "getParticipant", params).await
    }

    /// Number of participants matching a query expression
    ///
    /// e.g. `labels('corpus').includes('CC') && labels('participant_languages').includes('en')`
    async fn count_matching_participant_ids(&self, expression: &str) -> CallOutcome<u64> {
        let params = Parameters::new().with("expression", expression);
        query(self.core(), "countMatchingParticipantIds", params)
            .await
            .decode()
    }

    /// Ids of participants matching a query expression, optionally one page at a time
    async fn get_matching_participant_ids(
        &self,
        expression: &str,
        page_length: Option<u32>,
        page_number: Option<u32>,
    ) -> CallOutcome<Vec<String>> {
        let params = Parameters::new()
            .with("expression", expression)
            .with_opt("pageLength", page_length)
            .with_opt("pageNumber", page_number);
        query(self.core(), "getMatchingParticipantIds", params)
            .await
            .decode()
    }

    /// Ids of the transcripts in a corpus
    async fn get_transcript_ids_in_corpus(&self, corpus_id: &str) -> CallOutcome<Vec<String>> {
        let params = Parameters::new().with("id", corpus_id);
        query(self.core(), "getTranscriptIdsInCorpus", params)
            .await
            .decode()
    }

    /// Number of annotations on a layer of a transcript
    ///
    /// `max_ordinal` limits the count to annotations with at most that ordinal.
    async fn count_annotations(
        &self,
        transcript_id: &str,
        layer_id: &str,
        max_ordinal: Option<u32>,
    ) -> CallOutcome<u64> {
        let params = Parameters::new()
            .with("id", transcript_id)
            .with("layerId", layer_id)
            .with_opt("maxOrdinal", max_ordinal);
        query(self.core(), "countAnnotations", params).await.decode()
    }

    /// Annotations on a layer of a transcript, optionally one page at a time
    async fn get_annotations(
        &self,
        transcript_id: &str,
        layer_id: &str,
        max_ordinal: Option<u32>,
        page_length: Option<u32>,
        page_number: Option<u32>,
    ) -> CallOutcome<Vec<Value>> {
        let params = Parameters::new()
            .with("id", transcript_id)
            .with("layerId", layer_id)
            .with_opt("maxOrdinal", max_ordinal)
            .with_opt("pageLength", page_length)
            .with_opt("pageNumber", page_number);
        query(self.core(), "getAnnotations", params).await.decode()
    }

    /// Media tracks defined in the store
    async fn get_media_tracks(&self) -> CallOutcome<Vec<Value>> {
        query(self.core(), "getMediaTracks", Parameters::new())
            .await
            .decode()
    }

    /// Media files available for a transcript
    async fn get_available_media(&self, transcript_id: &str) -> CallOutcome<Vec<Value>> {
        let params = Parameters::new().with("id", transcript_id);
        query(self.core(), "getAvailableMedia", params)
            .await
            .decode()
    }

    /// URL of a transcript's media, optionally of an excerpt
    ///
    /// `track_suffix` selects the track (empty for the main one) and `mime_type` the format.
    async fn get_media(
        &self,
        transcript_id: &str,
        track_suffix: &str,
        mime_type: &str,
        start_offset: Option<f64>,
        end_offset: Option<f64>,
    ) -> CallOutcome<String> {
        let params = Parameters::new()
            .with("id", transcript_id)
            .with("trackSuffix", track_suffix)
            .with("mimeType", mime_type)
            .with_opt("startOffset", start_offset)
            .with_opt("endOffset", end_offset);
        query(self.core(), "getMedia", params).await.decode()
    }
}

async fn query(core: &StoreClient, call: &str, params: Parameters) -> CallOutcome {
    core.issue(call, &params, None, Method::Get).await
}
