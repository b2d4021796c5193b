use std::path::PathBuf;

use beacon_core::error::Result;
use clap::Parser;

use super::{load_from_file, IngestConfig, SinkKind};

/// Beacon, form and CSP report ingestion endpoint.
#[derive(Debug, Parser)]
#[command(name = "beacon-gateway", version)]
pub struct Cli {
    /// YAML config file; the flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. `:8080` or `127.0.0.1:9000`.
    #[arg(long)]
    pub addr: Option<String>,

    /// Append events to this file as NDJSON.
    #[arg(long, conflicts_with = "stdout")]
    pub data: Option<PathBuf>,

    /// Write events to standard output.
    #[arg(long)]
    pub stdout: bool,
}

impl Cli {
    /// Load the config file (or defaults), apply flag overrides, and validate.
    pub fn resolve(self) -> Result<IngestConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_from_file(path)?,
            None => IngestConfig::default(),
        };

        if let Some(addr) = self.addr {
            cfg.server.listen = addr;
        }
        if let Some(path) = self.data {
            cfg.sink.kind = SinkKind::File;
            cfg.sink.path = Some(path);
        } else if self.stdout {
            cfg.sink.kind = SinkKind::Stdout;
            cfg.sink.path = None;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}
