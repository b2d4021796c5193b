//! Shared application state for the ingestion endpoint.
//!
//! Handlers get a cheap clone of [`AppState`]; it carries the validated config,
//! the writer intake, and the metrics registry. The sink itself is never
//! reachable from here: it lives inside the writer task.

use std::sync::Arc;

use crate::config::IngestConfig;
use crate::obs::IngestMetrics;
use crate::writer::WriterHandle;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<IngestMetrics>,
}

struct AppStateInner {
    cfg: IngestConfig,
    writer: WriterHandle,
}

impl AppState {
    pub fn new(cfg: IngestConfig, writer: WriterHandle, metrics: Arc<IngestMetrics>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, writer }),
            metrics,
        }
    }

    pub fn cfg(&self) -> &IngestConfig {
        &self.inner.cfg
    }

    pub fn writer(&self) -> &WriterHandle {
        &self.inner.writer
    }

    pub fn metrics(&self) -> &IngestMetrics {
        &self.metrics
    }

    /// Draining starts when the shutdown signal arrives, or once the writer is gone.
    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining() || self.inner.writer.is_closed()
    }

    /// Gauges computed at scrape time.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![(
            "beacon_writer_queue_depth",
            self.inner.writer.queue_depth() as u64,
        )]
    }
}
