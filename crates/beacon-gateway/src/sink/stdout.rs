use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWriteExt, Stdout};

use beacon_core::error::{BeaconError, Result};

use super::Sink;

/// NDJSON on standard output, for running behind a log collector.
pub struct StdoutSink {
    out: Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn append(&mut self, line: Bytes) -> Result<()> {
        self.out
            .write_all(&line)
            .await
            .map_err(|e| BeaconError::SinkWrite(format!("stdout: {e}")))?;
        self.out
            .flush()
            .await
            .map_err(|e| BeaconError::SinkWrite(format!("stdout: {e}")))
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        self.out
            .flush()
            .await
            .map_err(|e| BeaconError::SinkWrite(format!("stdout: {e}")))
    }
}
