use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;
use serde::Deserialize;
use beacon_core::error::{BeaconError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub sink: SinkSection,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            sink: SinkSection::default(),
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BeaconError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.sink.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            redirect_url: default_redirect_url(),
            request_timeout_ms: default_request_timeout_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(self.redirect_url.starts_with("http://") || self.redirect_url.starts_with("https://"))
            || HeaderValue::from_str(&self.redirect_url).is_err()
        {
            return Err(BeaconError::BadRequest(
                "server.redirect_url must be an absolute http(s) url".into(),
            ));
        }
        if !(100..=60_000).contains(&self.request_timeout_ms) {
            return Err(BeaconError::BadRequest(
                "server.request_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if self.shutdown_grace_ms > 300_000 {
            return Err(BeaconError::BadRequest(
                "server.shutdown_grace_ms must be at most 300000".into(),
            ));
        }
        if !(1..=16 << 20).contains(&self.max_body_bytes) {
            return Err(BeaconError::BadRequest(
                "server.max_body_bytes must be between 1 and 16777216".into(),
            ));
        }
        Ok(())
    }

    /// Parse `listen`. A bare `:port` binds all interfaces.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let raw = if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        };
        raw.parse().map_err(|_| {
            BeaconError::BadRequest(format!(
                "server.listen must be a valid socket address: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_redirect_url() -> String {
    "https://seankhliao.com/".into()
}
fn default_request_timeout_ms() -> u64 {
    5000
}
fn default_shutdown_grace_ms() -> u64 {
    30000
}
fn default_max_body_bytes() -> usize {
    1 << 20
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Append NDJSON to `sink.path`.
    File,
    /// Write NDJSON to standard output.
    #[default]
    Stdout,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkSection {
    #[serde(default)]
    pub kind: SinkKind,

    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for SinkSection {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            path: None,
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SinkSection {
    pub fn validate(&self) -> Result<()> {
        if self.kind == SinkKind::File && self.path.is_none() {
            return Err(BeaconError::BadRequest(
                "sink.path is required when sink.kind is file".into(),
            ));
        }
        if !(1..=1 << 20).contains(&self.queue_capacity) {
            return Err(BeaconError::BadRequest(
                "sink.queue_capacity must be between 1 and 1048576".into(),
            ));
        }
        Ok(())
    }
}

fn default_queue_capacity() -> usize {
    1024
}
