//! Sequential batch download of sound and annotation fragments.
//!
//! A batch is N independent (resource id, start, end) triples. Items are fetched one at a time
//! in input order, so result `i` always belongs to input `i`; a failed item leaves `None` in its
//! slot and adds one error naming its index, and the batch carries on.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::params::Parameters;
use crate::types::{CallOutcome, Match, non_empty};
use crate::utils::{extension_for_mime, fragment_file_name};

use super::StoreClient;

const SOUND_MIME_TYPE: &str = "audio/wav";

/// What kind of fragment a batch fetches
#[derive(Clone, Debug, PartialEq)]
pub enum FragmentKind {
    /// WAV audio excerpts
    Sound {
        /// Requested sample rate (None = server default)
        sample_rate: Option<u32>,
    },
    /// Annotated transcript excerpts serialized to `mime_type`
    Annotated {
        /// Layers to include
        layer_ids: Vec<String>,
        /// Serialization format, e.g. `text/praat-textgrid`
        mime_type: String,
    },
}

impl FragmentKind {
    fn call_name(&self) -> &'static str {
        match self {
            FragmentKind::Sound { .. } => "getSoundFragments",
            FragmentKind::Annotated { .. } => "getFragments",
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            FragmentKind::Sound { .. } => "soundfragment",
            FragmentKind::Annotated { .. } => "api/serialize/fragment",
        }
    }

    fn mime_type(&self) -> &str {
        match self {
            FragmentKind::Sound { .. } => SOUND_MIME_TYPE,
            FragmentKind::Annotated { mime_type, .. } => mime_type,
        }
    }

    fn params(&self) -> Parameters {
        match self {
            FragmentKind::Sound { sample_rate } => {
                Parameters::new().with_opt("sampleRate", *sample_rate)
            }
            FragmentKind::Annotated {
                layer_ids,
                mime_type,
            } => Parameters::new()
                .with("layerId", layer_ids.clone())
                .with("mimeType", mime_type.as_str()),
        }
    }
}

/// Parallel input lists derived from search results
fn batch_from_matches(matches: &[Match]) -> (Vec<String>, Vec<f64>, Vec<f64>) {
    let ids = matches.iter().map(|m| m.transcript.clone()).collect();
    let starts = matches.iter().map(|m| m.line).collect();
    let ends = matches.iter().map(|m| m.line_end).collect();
    (ids, starts, ends)
}

impl StoreClient {
    /// Download one fragment per (id, start, end) triple into `dir`
    ///
    /// The three lists must be the same length; otherwise the outcome carries a single error and
    /// nothing is fetched. `dir` defaults to the configured temp directory (or the system one)
    /// and is created if missing. `extra` parameters are sent with every item.
    ///
    /// On return `result` holds exactly one entry per input, `None` where that item failed, and
    /// `errors` holds one entry per failed item.
    pub async fn fetch_fragments(
        &self,
        ids: &[String],
        starts: &[f64],
        ends: &[f64],
        kind: &FragmentKind,
        extra: &Parameters,
        dir: Option<&Path>,
    ) -> CallOutcome<Vec<Option<PathBuf>>> {
        let call = kind.call_name();
        if ids.len() != starts.len() || ids.len() != ends.len() {
            return CallOutcome::failure(
                call,
                None,
                format!(
                    "{} ids, {} start offsets and {} end offsets given; all three lists must be the same length",
                    ids.len(),
                    starts.len(),
                    ends.len()
                ),
            );
        }

        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => self
                .config
                .fragments
                .temp_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
        };
        if let Err(e) = self.files.create_dir(&dir).await {
            return CallOutcome::failure(
                call,
                None,
                format!("could not create directory {}: {}", dir.display(), e),
            );
        }

        tracing::info!(call, count = ids.len(), dir = %dir.display(), "fetching fragments");

        // One token for the whole batch: a cancel also fails the items not yet fetched
        let cancel = self.cancellation_token();

        let mut results = Vec::with_capacity(ids.len());
        let mut errors = Vec::new();
        for (index, ((id, &start), &end)) in ids.iter().zip(starts).zip(ends).enumerate() {
            match self
                .fetch_fragment(kind, id, start, end, extra, &dir, &cancel)
                .await {
                Ok(path) => results.push(Some(path)),
                Err(e) => {
                    tracing::warn!(call, index, id = %id, error = %e, "fragment failed");
                    errors.push(format!("fragment {} ({} {}-{}): {}", index, id, start, end, e));
                    results.push(None);
                }
            }
        }

        tracing::info!(
            call,
            succeeded = results.iter().filter(|r| r.is_some()).count(),
            failed = errors.len(),
            "fragment batch finished"
        );

        CallOutcome {
            result: Some(results),
            errors: non_empty(errors),
            messages: None,
            call: call.to_string(),
            item_id: None,
        }
    }

    /// Download WAV excerpts of transcripts' media
    pub async fn get_sound_fragments(
        &self,
        ids: &[String],
        starts: &[f64],
        ends: &[f64],
        sample_rate: Option<u32>,
        dir: Option<&Path>,
    ) -> CallOutcome<Vec<Option<PathBuf>>> {
        let kind = FragmentKind::Sound {
            sample_rate: sample_rate.or(self.config.fragments.sample_rate),
        };
        self.fetch_fragments(ids, starts, ends, &kind, &Parameters::new(), dir)
            .await
    }

    /// Download WAV excerpts covering each match's utterance
    pub async fn get_sound_fragments_for_matches(
        &self,
        matches: &[Match],
        sample_rate: Option<u32>,
        dir: Option<&Path>,
    ) -> CallOutcome<Vec<Option<PathBuf>>> {
        let (ids, starts, ends) = batch_from_matches(matches);
        self.get_sound_fragments(&ids, &starts, &ends, sample_rate, dir)
            .await
    }

    /// Download annotated excerpts of transcripts, serialized as `mime_type`
    pub async fn get_fragments(
        &self,
        ids: &[String],
        starts: &[f64],
        ends: &[f64],
        layer_ids: &[String],
        mime_type: &str,
        dir: Option<&Path>,
    ) -> CallOutcome<Vec<Option<PathBuf>>> {
        let kind = FragmentKind::Annotated {
            layer_ids: layer_ids.to_vec(),
            mime_type: mime_type.to_string(),
        };
        self.fetch_fragments(ids, starts, ends, &kind, &Parameters::new(), dir)
            .await
    }

    /// Download annotated excerpts covering each match's utterance
    pub async fn get_fragments_for_matches(
        &self,
        matches: &[Match],
        layer_ids: &[String],
        mime_type: &str,
        dir: Option<&Path>,
    ) -> CallOutcome<Vec<Option<PathBuf>>> {
        let (ids, starts, ends) = batch_from_matches(matches);
        self.get_fragments(&ids, &starts, &ends, layer_ids, mime_type, dir)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn fetch_fragment(
        &self,
        kind: &FragmentKind,
        id: &str,
        start: f64,
        end: f64,
        extra: &Parameters,
        dir: &Path,
        cancel: &CancellationToken,
    ) -> std::result::Result<PathBuf, String> {
        let mut params = Parameters::new()
            .with("id", id)
            .with("start", start)
            .with("end", end);
        params.extend(&kind.params());
        params.extend(extra);

        let url = self.config.url(kind.endpoint());
        let response = self
            .fetch_binary(kind.call_name(), &url, &params, kind.mime_type(), cancel)
            .await?;

        let filename = response.filename.unwrap_or_else(|| {
            fragment_file_name(id, start, end, extension_for_mime(kind.mime_type()))
        });
        let path = dir.join(filename);
        self.files
            .write(&path, &response.bytes)
            .await
            .map_err(|e| format!("could not write {}: {}", path.display(), e))?;

        tracing::debug!(id, start, end, path = %path.display(), bytes = response.bytes.len(), "fragment saved");
        Ok(path)
    }
}
