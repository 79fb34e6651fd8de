//! Shared test helpers for creating StoreClient instances against a mock server.

use crate::client::StoreClient;
use crate::config::{Config, Credentials};
use crate::storage::FragmentStore;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Mutex;
use wiremock::MockServer;

/// Path the mock store is mounted under
pub(crate) const BASE_PATH: &str = "/labbcat/";

/// Configuration pointing at the mock server's `/labbcat/`
pub(crate) fn test_config(server: &MockServer) -> Config {
    let mut config = Config::new(format!("{}{}", server.uri(), BASE_PATH));
    config.tasks.default_refresh = std::time::Duration::from_millis(50);
    config
}

/// Anonymous client for the mock server
pub(crate) fn client_for(server: &MockServer) -> StoreClient {
    StoreClient::new(test_config(server)).unwrap()
}

/// Client for the mock server that sends basic auth
pub(crate) fn authenticated_client_for(server: &MockServer) -> StoreClient {
    let mut config = test_config(server);
    config.credentials = Some(Credentials::new("labbcat", "secret"));
    StoreClient::new(config).unwrap()
}

/// Store path for a call, e.g. `/labbcat/api/store/getId`
pub(crate) fn store_path(call: &str) -> String {
    format!("{}api/store/{}", BASE_PATH, call)
}

/// Path relative to the mock base, e.g. `/labbcat/thread`
pub(crate) fn base_path(path: &str) -> String {
    format!("{}{}", BASE_PATH, path)
}

/// Successful envelope wrapping `result`
pub(crate) fn envelope(result: Value) -> Value {
    json!({
        "title": "LaBB-CAT",
        "version": "20240301.1025",
        "code": 0,
        "errors": [],
        "messages": [],
        "model": { "result": result }
    })
}

/// Failed envelope carrying `errors`
pub(crate) fn error_envelope(errors: &[&str]) -> Value {
    json!({
        "title": "LaBB-CAT",
        "code": 1,
        "errors": errors,
        "messages": [],
        "model": null
    })
}

/// Task status payload
pub(crate) fn task_json(id: &str, running: bool, refresh_seconds: u64) -> Value {
    let (percent, status) = if running {
        (50, "searching")
    } else {
        (100, "complete")
    };
    json!({
        "threadId": id,
        "threadName": "search",
        "running": running,
        "percentComplete": percent,
        "refreshSeconds": refresh_seconds,
        "status": status
    })
}

/// [`FragmentStore`] that records writes in memory, optionally failing them
#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    pub(crate) dirs: Mutex<Vec<std::path::PathBuf>>,
    pub(crate) files: Mutex<Vec<(std::path::PathBuf, Vec<u8>)>>,
    pub(crate) fail_writes: bool,
    pub(crate) fail_dirs: bool,
}

impl RecordingStore {
    pub(crate) fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub(crate) fn failing_dirs() -> Self {
        Self {
            fail_dirs: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl FragmentStore for RecordingStore {
    async fn create_dir(&self, dir: &Path) -> std::io::Result<()> {
        if self.fail_dirs {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only file system",
            ));
        }
        self.dirs.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if self.fail_writes {
            return Err(std::io::Error::other("disk full"));
        }
        self.files
            .lock()
            .unwrap()
            .push((path.to_path_buf(), bytes.to_vec()));
        Ok(())
    }
}
