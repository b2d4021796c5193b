//! Wire formats accepted by the receiver and written to the sink.
//!
//! - Form lane: urlencoded `/form`, `/api` and `/beacon` fields.
//! - CSP lane: `{"csp-report": {...}}` violation reports.
//! - Line codec: one JSON object per line (NDJSON) for persisted events.
//!
//! All parsers are panic-free: malformed input is reported as `BeaconError`
//! instead of panicking, keeping the receiver resilient to hostile traffic.

pub mod csp;
pub mod form;
pub mod line;
