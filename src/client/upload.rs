//! Multipart uploads: transcripts with media, and CSV match lists.

use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};

use crate::types::CallOutcome;

use super::StoreClient;

/// A transcript file and its media, ready to upload
///
/// ```
/// use labbcat::TranscriptUpload;
///
/// let upload = TranscriptUpload::new("AgnesShacklock-01.trs")
///     .with_media("AgnesShacklock-01.wav")
///     .with_corpus("UC")
///     .with_episode("AgnesShacklock");
/// assert_eq!(upload.media.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TranscriptUpload {
    /// Transcript file
    pub transcript: PathBuf,
    /// Media files to attach
    pub media: Vec<PathBuf>,
    /// Track suffix for the media (empty = main track)
    pub media_suffix: String,
    /// Transcript type
    pub transcript_type: Option<String>,
    /// Corpus to add the transcript to
    pub corpus: Option<String>,
    /// Episode the transcript belongs to
    pub episode: Option<String>,
}

impl TranscriptUpload {
    /// Upload of a single transcript file
    pub fn new(transcript: impl Into<PathBuf>) -> Self {
        Self {
            transcript: transcript.into(),
            ..Default::default()
        }
    }

    /// Attach a media file
    pub fn with_media(mut self, media: impl Into<PathBuf>) -> Self {
        self.media.push(media.into());
        self
    }

    /// Set the media track suffix
    pub fn with_media_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.media_suffix = suffix.into();
        self
    }

    /// Set the transcript type
    pub fn with_transcript_type(mut self, transcript_type: impl Into<String>) -> Self {
        self.transcript_type = Some(transcript_type.into());
        self
    }

    /// Set the corpus
    pub fn with_corpus(mut self, corpus: impl Into<String>) -> Self {
        self.corpus = Some(corpus.into());
        self
    }

    /// Set the episode
    pub fn with_episode(mut self, episode: impl Into<String>) -> Self {
        self.episode = Some(episode.into());
        self
    }

    fn item_id(&self) -> Option<String> {
        self.transcript
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

impl StoreClient {
    /// Upload a transcript, creating (`todo=new`) or replacing (`todo=update`) it
    ///
    /// The result maps each uploaded transcript name to the id of the server task processing it.
    pub(crate) async fn upload_transcript(
        &self,
        call: &str,
        todo: &str,
        upload: &TranscriptUpload,
    ) -> CallOutcome {
        let item_id = upload.item_id();
        let mut form = Form::new().text("todo", todo.to_string()).text("auto", "true");
        if let Some(transcript_type) = &upload.transcript_type {
            form = form.text("transcript_type", transcript_type.clone());
        }
        if let Some(corpus) = &upload.corpus {
            form = form.text("corpus", corpus.clone());
        }
        if let Some(episode) = &upload.episode {
            form = form.text("episode", episode.clone());
        }

        let transcript = match file_part(&upload.transcript).await {
            Ok(part) => part,
            Err(e) => return CallOutcome::failure(call, item_id, e),
        };
        form = form.part("uploadfile1_0", transcript);

        for (index, media) in upload.media.iter().enumerate() {
            let part = match file_part(media).await {
                Ok(part) => part,
                Err(e) => return CallOutcome::failure(call, item_id, e),
            };
            form = form.part(
                format!("uploadmedia{}{}", upload.media_suffix, index + 1),
                part,
            );
        }

        tracing::info!(
            call,
            transcript = %upload.transcript.display(),
            media = upload.media.len(),
            "uploading transcript"
        );
        let url = self.config.url("edit/transcript/new");
        self.issue_multipart(call, &url, form, item_id).await
    }

    /// Look up annotations on the given layers for each match id
    ///
    /// The match ids are sent as a one-column CSV file; the result has one row per match id,
    /// each row holding up to `annotations_per_layer` annotations for each layer in order.
    pub async fn get_match_annotations(
        &self,
        match_ids: &[String],
        layer_ids: &[String],
        target_offset: i64,
        annotations_per_layer: u32,
    ) -> CallOutcome {
        let call = "getMatchAnnotations";
        if match_ids.is_empty() {
            return CallOutcome::failure(call, None, "no match ids given");
        }

        let mut csv = String::from("MatchId\n");
        for id in match_ids {
            csv.push_str(&csv_field(id));
            csv.push('\n');
        }
        let csv_part = match Part::bytes(csv.into_bytes())
            .file_name("matches.csv")
            .mime_str("text/csv")
        {
            Ok(part) => part,
            Err(e) => return CallOutcome::failure(call, None, e.to_string()),
        };

        let mut form = Form::new()
            .text("csvFieldDelimiter", ",")
            .text("targetColumn", "0")
            .text("copyColumns", "false")
            .text("targetOffset", target_offset.to_string())
            .text("annotationsPerLayer", annotations_per_layer.to_string());
        for layer in layer_ids {
            form = form.text("layer", layer.clone());
        }
        form = form.part("uploadfile", csv_part);

        let url = self.config.url("api/getMatchAnnotations");
        self.issue_multipart(call, &url, form, None).await
    }
}

async fn file_part(path: &Path) -> std::result::Result<Part, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("could not read {}: {}", path.display(), e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Part::bytes(bytes).file_name(name))
}

/// Quote a CSV field when it needs it
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("g_3;n_1-n_2;prefix=001-"), "g_3;n_1-n_2;prefix=001-");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_upload_item_id_is_file_name() {
        let upload = TranscriptUpload::new("/data/AgnesShacklock-01.trs");
        assert_eq!(upload.item_id().as_deref(), Some("AgnesShacklock-01.trs"));
    }

    #[tokio::test]
    async fn test_file_part_missing_file() {
        let err = file_part(Path::new("/nonexistent/file.trs")).await.unwrap_err();
        assert!(err.contains("could not read"));
        assert!(err.contains("file.trs"));
    }
}
