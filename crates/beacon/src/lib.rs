//! Top-level facade crate for the beacon ingestion endpoint.
//!
//! Re-exports the core event model and the gateway library so users can depend on a single crate.

pub mod core {
    pub use beacon_core::*;
}

pub mod gateway {
    pub use beacon_gateway::*;
}
