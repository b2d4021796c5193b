//! Minimal metrics registry for the ingestion endpoint.
//!
//! Counters and histograms with dynamic labels backed by `DashMap` + atomics,
//! so many receiver tasks can increment concurrently without locking. Labels
//! are flattened into sorted key vectors to keep deterministic ordering.
//! Latency buckets are fixed in microseconds to avoid floating point math.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn render_labels(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for one label set (0 if never incremented).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, render_labels(r.key()), val);
        }
    }
}

// 50us .. 1s
const BUCKETS_MICROS: [u64; 9] = [
    50, 100, 250, 500, 1_000, 5_000, 10_000, 100_000, 1_000_000,
];

struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; BUCKETS_MICROS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets (microsecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of observations for one label set.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format (unit: microseconds).
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for r in self.map.iter() {
            let hist = r.value();
            let label_str = render_labels(r.key());
            let prefix = if label_str.is_empty() {
                String::new()
            } else {
                format!("{},", label_str)
            };

            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, count);
            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_sum{{{}}} {}", name, label_str, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", name, label_str, count);
        }
    }
}

/// Registry owned by `AppState` and shared with the writer task.
#[derive(Default)]
pub struct IngestMetrics {
    /// Accepted requests, one increment per event handed to the writer.
    pub endpoint_hits: CounterVec,
    /// Rejected requests by endpoint and client code.
    pub rejections: CounterVec,
    pub serve_latency: HistogramVec,
    /// Lines appended to the sink.
    pub events_written: CounterVec,
    draining: AtomicBool,
}

impl IngestMetrics {
    /// Mark draining state.
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Render all registered metrics plus any extra gauges provided by callers.
    pub fn render(&self, extra: &[(&str, u64)]) -> String {
        let mut out = String::new();
        self.endpoint_hits.render("beacon_endpoint_hits_total", &mut out);
        self.rejections.render("beacon_rejections_total", &mut out);
        self.serve_latency.render("beacon_serve_latency_micros", &mut out);
        self.events_written.render("beacon_events_written_total", &mut out);

        let _ = writeln!(
            out,
            "# TYPE beacon_draining gauge\nbeacon_draining {}",
            u8::from(self.is_draining())
        );
        for (k, v) in extra {
            let _ = writeln!(out, "# TYPE {} gauge\n{} {}", k, k, v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_labels_are_order_independent() {
        let c = CounterVec::default();
        c.inc(&[("endpoint", "json"), ("reason", "BAD_REQUEST")]);
        c.inc(&[("reason", "BAD_REQUEST"), ("endpoint", "json")]);
        assert_eq!(c.get(&[("endpoint", "json"), ("reason", "BAD_REQUEST")]), 2);
        assert_eq!(c.get(&[("endpoint", "form")]), 0);
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let m = IngestMetrics::default();
        m.serve_latency
            .observe(&[("endpoint", "form")], Duration::from_micros(300));
        let text = m.render(&[]);
        assert!(text.contains("beacon_serve_latency_micros_bucket{endpoint=\"form\",le=\"250\"} 0"));
        assert!(text.contains("beacon_serve_latency_micros_bucket{endpoint=\"form\",le=\"500\"} 1"));
        assert!(text.contains("beacon_serve_latency_micros_bucket{endpoint=\"form\",le=\"+Inf\"} 1"));
        assert!(text.contains("beacon_serve_latency_micros_sum{endpoint=\"form\"} 300"));
    }

    #[test]
    fn render_includes_draining_and_extra() {
        let m = IngestMetrics::default();
        m.endpoint_hits.inc(&[("endpoint", "beacon")]);
        m.set_draining();
        let text = m.render(&[("beacon_writer_queue_depth", 3)]);
        assert!(text.contains("beacon_endpoint_hits_total{endpoint=\"beacon\"} 1"));
        assert!(text.contains("beacon_draining 1"));
        assert!(text.contains("beacon_writer_queue_depth 3"));
    }
}
