//! Local storage for downloaded fragments
//!
//! The batch downloader only needs two things from a file system: make sure the destination
//! directory exists, and write a file. [`FragmentStore`] captures exactly that so embedders can
//! redirect output (or tests can inject failures).

use async_trait::async_trait;
use std::path::Path;

/// Destination for downloaded fragment files
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Ensure `dir` exists, creating a single missing level
    async fn create_dir(&self, dir: &Path) -> std::io::Result<()>;

    /// Write `bytes` to `path`, replacing any existing file
    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
}

/// [`FragmentStore`] backed by the local file system
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileStore;

#[async_trait]
impl FragmentStore for LocalFileStore {
    async fn create_dir(&self, dir: &Path) -> std::io::Result<()> {
        if tokio::fs::metadata(dir).await.is_ok_and(|m| m.is_dir()) {
            return Ok(());
        }
        match tokio::fs::create_dir(dir).await {
            Ok(()) => {
                tracing::debug!(dir = %dir.display(), "created fragment directory");
                Ok(())
            }
            // Lost a race with another writer
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(path, bytes).await
    }
}
