//! Filter artifact persistence.

use crate::errors::GatewayError;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Sink for persisted filter artifacts.
///
/// One file per filter at `<dir>/<file_name>`, content written verbatim and
/// fully replacing prior content. Implementations must replace atomically: a
/// concurrent reader observes either the old or the new content, never a
/// partial write.
#[async_trait]
pub trait FilterWriter: Send + Sync {
    /// Writes `content` to `<dir>/<file_name>`.
    async fn write(&self, dir: &Path, file_name: &str, content: &str)
        -> Result<(), GatewayError>;
}

/// Disk-backed writer using write-to-temporary-then-rename.
///
/// The temporary file lives in the destination directory so the final rename
/// stays on one filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFilterWriter;

impl DiskFilterWriter {
    /// Creates a new disk writer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FilterWriter for DiskFilterWriter {
    async fn write(
        &self,
        dir: &Path,
        file_name: &str,
        content: &str,
    ) -> Result<(), GatewayError> {
        let target = dir.join(file_name);
        let staging = dir.join(format!(".{file_name}.tmp"));
        let persist = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&staging, content).await?;
            tokio::fs::rename(&staging, &target).await
        };

        persist.await.map_err(|source| GatewayError::Persistence {
            path: target.display().to_string(),
            source,
        })?;

        debug!(path = %target.display(), bytes = content.len(), "filter artifact written");
        Ok(())
    }
}
