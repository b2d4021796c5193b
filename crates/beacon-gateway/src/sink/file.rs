use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use beacon_core::error::{BeaconError, Result};

use super::Sink;

/// Append-mode NDJSON file. Restarts never truncate prior history.
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| BeaconError::SinkOpen(format!("open {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "file sink opened");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }
}

#[async_trait]
impl Sink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn append(&mut self, line: Bytes) -> Result<()> {
        self.file
            .write_all(&line)
            .await
            .map_err(|e| BeaconError::SinkWrite(format!("write {}: {e}", self.path.display())))?;
        // tokio's File completes writes in the background until flushed
        self.file
            .flush()
            .await
            .map_err(|e| BeaconError::SinkWrite(format!("flush {}: {e}", self.path.display())))
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        self.file
            .flush()
            .await
            .map_err(|e| BeaconError::SinkWrite(format!("flush {}: {e}", self.path.display())))?;
        self.file
            .sync_all()
            .await
            .map_err(|e| BeaconError::SinkWrite(format!("sync {}: {e}", self.path.display())))?;
        tracing::info!(path = %self.path.display(), "file sink closed");
        Ok(())
    }
}
