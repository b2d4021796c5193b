//! Urlencoded form lanes.
//!
//! Fields are kept verbatim. The only normalization is the `ms` suffix strip
//! on the beacon duration.

use crate::error::{BeaconError, Result};
use crate::event::{BeaconRecord, FormRecord};

/// Decoded urlencoded pairs in submission order. Keys may repeat.
pub type FormPairs = Vec<(String, String)>;

/// First value submitted for `key`; later repeats are ignored.
fn first(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

/// Raw `/form` and `/api` fields. Missing fields become empty strings.
#[derive(Debug, Default)]
pub struct FormFields {
    pub trigger: Option<String>,
    pub src: Option<String>,
    pub dst: Option<String>,
    pub dur: Option<String>,
}

impl FormFields {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            trigger: first(pairs, "trigger"),
            src: first(pairs, "src"),
            dst: first(pairs, "dst"),
            dur: first(pairs, "dur"),
        }
    }

    pub fn into_record(self) -> FormRecord {
        FormRecord {
            trigger: self.trigger.unwrap_or_default(),
            src: self.src.unwrap_or_default(),
            dst: self.dst.unwrap_or_default(),
            dur: self.dur.unwrap_or_default(),
        }
    }
}

/// Raw `/beacon` fields (`navigator.sendBeacon` style).
#[derive(Debug, Default)]
pub struct BeaconFields {
    pub dur: Option<String>,
    pub src: Option<String>,
    pub dst: Option<String>,
    pub referrer: Option<String>,
}

impl BeaconFields {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            dur: first(pairs, "dur"),
            src: first(pairs, "src"),
            dst: first(pairs, "dst"),
            referrer: first(pairs, "referrer"),
        }
    }

    /// Convert into a record. A missing or unparsable `dur` rejects the beacon.
    pub fn into_record(self) -> Result<BeaconRecord> {
        let dur = self
            .dur
            .ok_or_else(|| BeaconError::BadRequest("missing dur".into()))?;
        Ok(BeaconRecord {
            duration_ms: parse_duration_ms(&dur)?,
            src_page: self.src.unwrap_or_default(),
            dst_page: self.dst.unwrap_or_default(),
            referrer: self.referrer.unwrap_or_default(),
        })
    }
}

/// Parse a beacon duration: ASCII digits with an optional `ms` suffix, e.g. `1500ms` or `1500`.
///
/// Signs, decimals, exponents and whitespace are rejected.
pub fn parse_duration_ms(raw: &str) -> Result<u64> {
    let digits = raw.strip_suffix("ms").unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BeaconError::BadRequest(format!("invalid dur: {raw:?}")));
    }
    digits
        .parse::<u64>()
        .map_err(|_| BeaconError::BadRequest(format!("dur out of range: {raw:?}")))
}
