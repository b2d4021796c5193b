//! Newline-delimited JSON codec for persisted events.

use bytes::Bytes;

use crate::error::{BeaconError, Result};
use crate::event::Event;

/// Encode one event as a single `\n`-terminated JSON line.
pub fn encode_line(event: &Event) -> Result<Bytes> {
    let mut buf = serde_json::to_vec(event)
        .map_err(|e| BeaconError::Internal(format!("encode event failed: {e}")))?;
    buf.push(b'\n');
    Ok(Bytes::from(buf))
}

/// Decode one persisted line (trailing newline optional).
pub fn decode_line(line: &[u8]) -> Result<Event> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    serde_json::from_slice(line).map_err(|e| BeaconError::BadRequest(format!("invalid event line: {e}")))
}
