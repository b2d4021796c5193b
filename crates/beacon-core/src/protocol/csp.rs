//! Content-Security-Policy violation reports (`application/csp-report`).
//!
//! Browsers disagree on member types (`status-code` as number or string,
//! `line-number` present or not), so the report is kept as the object the
//! client sent. Only the envelope shape is enforced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BeaconError, Result};

/// Request body envelope: `{"csp-report": {...}}`.
#[derive(Debug, Deserialize)]
pub struct CspEnvelope {
    #[serde(rename = "csp-report")]
    pub report: CspReport,
}

/// One violation report, members preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CspReport(Map<String, Value>);

impl CspReport {
    pub fn get(&self, member: &str) -> Option<&Value> {
        self.0.get(member)
    }

    pub fn members(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn violated_directive(&self) -> Option<&Value> {
        self.get("violated-directive")
    }

    pub fn blocked_uri(&self) -> Option<&Value> {
        self.get("blocked-uri")
    }

    pub fn summary(&self) -> String {
        summarize(&self.0)
    }
}

/// `csp policy <directive> blocked <uri> on <document>` for a report object.
pub fn summarize(members: &Map<String, Value>) -> String {
    format!(
        "csp policy {} blocked {} on {}",
        display_member(members.get("violated-directive")),
        display_member(members.get("blocked-uri")),
        display_member(members.get("document-uri")),
    )
}

/// Strings print bare, other values as JSON, absent members as `<nil>`.
fn display_member(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<nil>".to_string(),
    }
}

/// Parse a CSP report body. The body must be a JSON object whose
/// `csp-report` member is itself an object.
pub fn parse_report(body: &[u8]) -> Result<CspReport> {
    let env: CspEnvelope = serde_json::from_slice(body)
        .map_err(|e| BeaconError::BadRequest(format!("invalid csp report: {e}")))?;
    Ok(env.report)
}
