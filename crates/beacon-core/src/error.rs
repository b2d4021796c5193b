//! Shared error type across beacon crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed body.
    BadRequest,
    /// Method not accepted on this endpoint.
    NotAllowed,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Ingestion pipeline is not accepting events.
    Unavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotAllowed => "NOT_ALLOWED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BeaconError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("writer closed")]
    WriterClosed,
    #[error("sink open failed: {0}")]
    SinkOpen(String),
    #[error("sink write failed: {0}")]
    SinkWrite(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BeaconError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            BeaconError::BadRequest(_) => ClientCode::BadRequest,
            BeaconError::MethodNotAllowed => ClientCode::NotAllowed,
            BeaconError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            BeaconError::WriterClosed => ClientCode::Unavailable,
            BeaconError::SinkOpen(_) | BeaconError::SinkWrite(_) | BeaconError::Internal(_) => {
                ClientCode::Internal
            }
        }
    }

    /// Whether the error originates from the caller's input rather than the pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BeaconError::BadRequest(_) | BeaconError::MethodNotAllowed
        )
    }
}
