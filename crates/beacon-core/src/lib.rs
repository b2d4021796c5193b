//! beacon core: transport-agnostic event model, wire formats, and error types.
//!
//! This crate defines the event records persisted by the gateway and the
//! parsers for the inbound form, JSON, and CSP lanes. It carries no transport
//! or runtime dependencies so the model can be reused by tooling that reads
//! the NDJSON log back.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `BeaconError`/`Result` so the receiver
//! never crashes on malformed input.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod event;
pub mod protocol;

/// Shared result type.
pub use error::{BeaconError, Result};
pub use event::{BeaconRecord, Event, FormRecord, Record};
