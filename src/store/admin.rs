//! Corpus administration.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{Method, StoreClient};
use crate::params::Parameters;
use crate::types::CallOutcome;

use super::StoreEdit;

const CORPORA_PATH: &str = "api/admin/corpora";

/// Administration of the store's corpora (`api/admin/corpora`)
///
/// Corpus records travel as JSON bodies
/// `{"corpus_name": ..., "corpus_language": ..., "corpus_description": ...}`.
#[async_trait]
pub trait StoreAdmin: StoreEdit {
    /// Create a corpus
    async fn create_corpus(
        &self,
        corpus_name: &str,
        corpus_language: &str,
        corpus_description: &str,
    ) -> CallOutcome {
        tracing::info!(corpus_name, "creating corpus");
        let body = corpus_record(corpus_name, corpus_language, corpus_description);
        let core = self.core();
        core.issue_json("createCorpus", &corpora_url(core), Method::Post, &body)
            .await
    }

    /// List corpora, optionally one page at a time
    async fn read_corpora(
        &self,
        page_number: Option<u32>,
        page_length: Option<u32>,
    ) -> CallOutcome<Vec<Value>> {
        let params = Parameters::new()
            .with_opt("pageNumber", page_number)
            .with_opt("pageLength", page_length);
        let core = self.core();
        core.issue("readCorpora", &params, Some(&corpora_url(core)), Method::Get)
            .await
            .decode()
    }

    /// Update a corpus's language and description
    async fn update_corpus(
        &self,
        corpus_name: &str,
        corpus_language: &str,
        corpus_description: &str,
    ) -> CallOutcome {
        tracing::info!(corpus_name, "updating corpus");
        let body = corpus_record(corpus_name, corpus_language, corpus_description);
        let core = self.core();
        core.issue_json("updateCorpus", &corpora_url(core), Method::Put, &body)
            .await
    }

    /// Delete a corpus
    async fn delete_corpus(&self, corpus_name: &str) -> CallOutcome {
        tracing::info!(corpus_name, "deleting corpus");
        let core = self.core();
        let url = format!("{}/{}", corpora_url(core), urlencoding::encode(corpus_name));
        core.issue("deleteCorpus", &Parameters::new(), Some(&url), Method::Delete)
            .await
    }
}

fn corpora_url(core: &StoreClient) -> String {
    core.config().url(CORPORA_PATH)
}

fn corpus_record(name: &str, language: &str, description: &str) -> Value {
    json!({
        "corpus_name": name,
        "corpus_language": language,
        "corpus_description": description,
    })
}
