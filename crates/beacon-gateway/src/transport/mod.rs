//! HTTP transport concerns shared by all endpoints.
//!
//! - CORS gate: answers preflights, rejects unsupported methods.
//! - Request metadata: best-effort client attribution.
//! - Error mapping: `BeaconError` -> HTTP status.

pub mod cors;
pub mod meta;
pub mod response;
