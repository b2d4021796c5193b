//! Output sinks.
//!
//! A sink is the single mutable resource events are appended to. Exactly one
//! sink exists per process; it is moved into the writer task at startup and
//! never shared. `close` consumes the sink, so it can run at most once.

pub mod file;
pub mod memory;
pub mod stdout;

use async_trait::async_trait;
use bytes::Bytes;

use beacon_core::error::Result;

use crate::config::{SinkKind, SinkSection};

pub use file::FileSink;
pub use memory::{MemoryReader, MemorySink};
pub use stdout::StdoutSink;

/// Append-only line sink.
#[async_trait]
pub trait Sink: Send {
    /// Short backend name used as a metrics label.
    fn name(&self) -> &'static str;

    /// Append one encoded line. Returns only once the bytes left process buffers.
    async fn append(&mut self, line: Bytes) -> Result<()>;

    /// Flush and release the underlying resource.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Open the sink selected by configuration. Failure here is fatal to startup.
pub async fn open(cfg: &SinkSection) -> Result<Box<dyn Sink>> {
    match cfg.kind {
        SinkKind::File => {
            let path = cfg.path.as_deref().ok_or_else(|| {
                beacon_core::BeaconError::SinkOpen("file sink requires a path".into())
            })?;
            Ok(Box::new(FileSink::open(path).await?))
        }
        SinkKind::Stdout => Ok(Box::new(StdoutSink::new())),
    }
}
