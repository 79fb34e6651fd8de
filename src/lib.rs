//! # labbcat
//!
//! Client library for the web API of a LaBB-CAT annotation store.
//!
//! ## Design Philosophy
//!
//! labbcat is designed to be:
//! - **Outcome-based** - Every call settles exactly once with a [`CallOutcome`], never a panic
//!   or an unhandled rejection
//! - **Capability-scoped** - Read, edit and admin endpoints are only reachable through a handle
//!   that grants them
//! - **Non-blocking** - Task polling and batch downloads wait on timers, not threads
//! - **Library-first** - No CLI, no global state; diagnostics and cancellation are per client
//!
//! ## Quick Start
//!
//! ```no_run
//! use labbcat::{Config, Credentials, LabbcatView, SearchOptions, StoreRead, WaitLimit};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::new("https://labbcat.example.org/labbcat");
//!     config.credentials = Some(Credentials::new("demo", "demo"));
//!     let store = LabbcatView::new(config)?;
//!
//!     println!("layers: {:?}", store.get_layer_ids().await.result);
//!
//!     // Search, wait for the server task, then fetch the matches and their audio
//!     let pattern = json!({"columns": [{"layers": {"orthography": {"pattern": "knox"}}}]});
//!     let task = store.search(&pattern, &SearchOptions::default()).await;
//!     if let Some(task_id) = task.result {
//!         store.wait_for_task(&task_id, WaitLimit::from_secs(60)).await;
//!         let matches = store.get_matches(&task_id, None).await;
//!         if let Some(matches) = matches.result {
//!             let clips = store.get_sound_fragments_for_matches(&matches, None, None).await;
//!             for (m, clip) in matches.iter().zip(clips.result.unwrap_or_default()) {
//!                 println!("{}: {:?}", m.text, clip);
//!             }
//!         }
//!         store.release_task(&task_id).await;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Store client core (decomposed into focused submodules)
pub mod client;
/// Configuration types
pub mod config;
/// Per-client diagnostic output
pub mod diagnostics;
/// Response envelope and outcome normalization
pub mod envelope;
/// Error types
pub mod error;
/// Match identifier parsing
pub mod match_id;
/// Request parameters
pub mod params;
/// Fragment file storage
pub mod storage;
/// Capability traits and handles
pub mod store;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use client::{FragmentKind, Method, SearchOptions, StoreClient, TranscriptUpload, WaitLimit};
pub use config::{Config, Credentials, FragmentConfig, HttpConfig, TaskConfig};
pub use diagnostics::{DiagnosticSink, Diagnostics, MemorySink, TracingSink};
pub use envelope::{Envelope, Exchange};
pub use error::{Error, Result};
pub use match_id::{MatchId, MatchInterval};
pub use params::{ParamValue, Parameters};
pub use storage::{FragmentStore, LocalFileStore};
pub use store::{LabbcatAdmin, LabbcatEdit, LabbcatView, StoreAdmin, StoreEdit, StoreRead};
pub use types::{CallOutcome, Match, TaskStatus};
