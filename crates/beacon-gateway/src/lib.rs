//! Beacon ingestion gateway library entry.
//!
//! This crate wires the HTTP receiver, the sequential writer, the sinks, and
//! the ops endpoints into one service. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod receiver;
pub mod router;
pub mod server;
pub mod sink;
pub mod transport;
pub mod writer;
