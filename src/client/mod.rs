//! Store client core, split into focused submodules.
//!
//! The `StoreClient` struct and its methods are organized by concern:
//! - [`request`] - The request primitive every call goes through
//! - [`tasks`] - Long-running task status, polling and control
//! - [`fragments`] - Sequential batch download of media/annotation fragments
//! - [`search`] - Pattern search and result retrieval
//! - [`upload`] - Multipart transcript uploads

mod fragments;
mod request;
mod search;
mod tasks;
mod upload;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use fragments::FragmentKind;
pub use request::Method;
pub use search::SearchOptions;
pub use tasks::WaitLimit;
pub use upload::TranscriptUpload;

use crate::config::Config;
use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::error::Result;
use crate::storage::{FragmentStore, LocalFileStore};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

/// Core client for one store (cloneable - all fields are Arc-wrapped)
///
/// Holds the transport and the operations with real protocol behaviour. The thin per-endpoint
/// methods live on the capability traits in [`crate::store`].
#[derive(Clone)]
pub struct StoreClient {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Shared HTTP connection pool
    pub(crate) http: reqwest::Client,
    /// Verbose diagnostic output, scoped to this client
    pub(crate) diagnostics: Diagnostics,
    /// Token of the current request generation, replaced on every cancel
    pub(crate) cancel: Arc<Mutex<CancellationToken>>,
    /// Where downloaded fragments are written
    pub(crate) files: Arc<dyn FragmentStore>,
}

impl StoreClient {
    /// Create a client for the configured store
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .connect_timeout(config.http.timeout)
            .timeout(config.http.timeout)
            .user_agent(config.http.user_agent.clone())
            .build()?;

        tracing::debug!(
            base_url = %config.base(),
            authenticated = config.active_credentials().is_some(),
            "store client created"
        );

        Ok(Self {
            config: Arc::new(config),
            http,
            diagnostics: Diagnostics::default(),
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            files: Arc::new(LocalFileStore),
        })
    }

    /// Send verbose diagnostics to `sink` instead of `tracing`
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        let verbose = self.diagnostics.is_verbose();
        self.diagnostics = Diagnostics::new(sink);
        self.diagnostics.set_verbose(verbose);
        self
    }

    /// Write downloaded fragments through `store`
    pub fn with_file_store(mut self, store: Arc<dyn FragmentStore>) -> Self {
        self.files = store;
        self
    }

    /// The client's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Turn verbose diagnostics on or off for this client (and its clones)
    pub fn set_verbose(&self, verbose: bool) {
        self.diagnostics.set_verbose(verbose);
    }

    /// The client's diagnostics
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Token of the requests started from now until the next [`cancel_pending`](Self::cancel_pending)
    ///
    /// Cancelling it aborts those requests, as well as polls and batches running under it.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Abort every in-flight request; each settles with the error `cancelled`
    ///
    /// Running polls and fragment batches stop too. Requests started afterwards are sent as
    /// usual. Server-side tasks keep running; use [`cancel_task`](Self::cancel_task) to stop one.
    pub fn cancel_pending(&self) {
        tracing::info!(base_url = %self.config.base(), "cancelling pending requests");
        let previous = std::mem::replace(
            &mut *self.cancel.lock().unwrap_or_else(PoisonError::into_inner),
            CancellationToken::new(),
        );
        previous.cancel();
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("base_url", &self.config.base_url)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
