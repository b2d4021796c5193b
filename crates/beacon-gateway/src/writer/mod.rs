//! Sequential writer: the only task that touches the sink.
//!
//! Receivers hold cloned [`WriterHandle`]s and `submit` events into a bounded
//! queue. One background task pops events in queue order and serializes each
//! one to the sink before taking the next, so no two events are ever written
//! concurrently.
//!
//! Lifecycle:
//! - Open: queue accepts events; each is appended before the next is popped.
//! - Draining: `shutdown` closed the queue; already-queued events are still written.
//! - Closed: queue empty, sink closed exactly once; `submit` now fails with
//!   `WriterClosed`.
//!
//! A sink write failure ends the loop with an error. Nothing is retried; the
//! binary treats this as fatal and exits.
//!
//! Receivers respond as soon as `submit` returns, i.e. before the line is
//! persisted. Callers needing write-through confirmation are not served by
//! this design.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use beacon_core::error::{BeaconError, Result};
use beacon_core::protocol::line::encode_line;
use beacon_core::Event;

use crate::obs::IngestMetrics;
use crate::sink::Sink;

/// Cloneable intake side of the writer.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Event>,
}

impl WriterHandle {
    /// Hand an event to the writer.
    ///
    /// Suspends while the queue is full (back-pressure onto the request path).
    /// Fails loudly once the writer is draining or gone.
    pub async fn submit(&self, event: Event) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| BeaconError::WriterClosed)
    }

    /// Events accepted but not yet written.
    pub fn queue_depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Summary returned when the writer finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterReport {
    /// Lines appended during this process lifetime.
    pub written: u64,
}

/// Owner side of the writer task.
pub struct WriterTask {
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<Result<WriterReport>>>,
}

/// Spawn the writer task, moving the sink into it.
pub fn spawn(
    sink: Box<dyn Sink>,
    capacity: usize,
    metrics: Arc<IngestMetrics>,
) -> (WriterHandle, WriterTask) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let join = tokio::spawn(run(sink, rx, shutdown_rx, metrics));

    (
        WriterHandle { tx },
        WriterTask {
            shutdown: Some(shutdown_tx),
            join: Some(join),
        },
    )
}

impl WriterTask {
    /// Resolves only if the writer loop ends on its own, which while serving
    /// means the sink failed. Cancel-safe; pending forever once consumed.
    pub async fn stopped(&mut self) -> Result<WriterReport> {
        let Some(join) = self.join.as_mut() else {
            return std::future::pending().await;
        };
        let res = join.await;
        self.join = None;
        flatten_join(res)
    }

    /// Close intake, drain queued events, close the sink, and report.
    pub async fn shutdown(mut self) -> Result<WriterReport> {
        if let Some(tx) = self.shutdown.take() {
            // loop may already have exited on its own
            let _ = tx.send(());
        }
        match self.join.take() {
            Some(join) => flatten_join(join.await),
            None => Err(BeaconError::Internal("writer already stopped".into())),
        }
    }
}

fn flatten_join(
    res: std::result::Result<Result<WriterReport>, tokio::task::JoinError>,
) -> Result<WriterReport> {
    res.map_err(|e| BeaconError::Internal(format!("writer task failed: {e}")))?
}

async fn run(
    mut sink: Box<dyn Sink>,
    mut rx: mpsc::Receiver<Event>,
    mut shutdown: oneshot::Receiver<()>,
    metrics: Arc<IngestMetrics>,
) -> Result<WriterReport> {
    let sink_name = sink.name();
    let mut written = 0u64;
    let mut draining = false;

    tracing::info!(sink = sink_name, "writer started");

    loop {
        tokio::select! {
            biased;

            // Also fires if the WriterTask was dropped.
            _ = &mut shutdown, if !draining => {
                draining = true;
                rx.close();
                tracing::info!(sink = sink_name, written, "writer draining");
            }

            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else { break };
                if let Err(e) = serialize_and_persist(sink.as_mut(), &event).await {
                    tracing::error!(sink = sink_name, written, error = %e, "sink write failed, writer stopping");
                    return Err(e);
                }
                written += 1;
                metrics.events_written.inc(&[("sink", sink_name)]);
            }
        }
    }

    sink.close().await?;
    tracing::info!(sink = sink_name, written, "writer closed");
    Ok(WriterReport { written })
}

/// Encode one event as an NDJSON line and append it to the sink.
async fn serialize_and_persist(sink: &mut dyn Sink, event: &Event) -> Result<()> {
    let line = encode_line(event)?;
    sink.append(line).await
}
