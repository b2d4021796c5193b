//! Ingest config loader (strict parsing) and command-line overrides.

pub mod cli;
pub mod schema;

use std::fs;
use std::path::Path;

use beacon_core::error::{BeaconError, Result};

pub use cli::Cli;
pub use schema::{IngestConfig, ServerSection, SinkKind, SinkSection};

pub fn load_from_file(path: &Path) -> Result<IngestConfig> {
    let s = fs::read_to_string(path).map_err(|e| {
        BeaconError::Internal(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<IngestConfig> {
    let cfg: IngestConfig = serde_yaml::from_str(s)
        .map_err(|e| BeaconError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
