//! Lightweight in-process metrics.
//!
//! Metrics are stored as atomics in a registry object passed to the handlers
//! and the writer (no process globals), and rendered by the `/metrics` handler.

pub mod metrics;

pub use metrics::IngestMetrics;
