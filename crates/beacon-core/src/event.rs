//! Normalized event model.
//!
//! An [`Event`] is built once by the receiver and then only moved: it owns all
//! of its data, exposes no mutators, and is serialized as one JSON object per
//! line with the record fields flattened next to `Time`/`Remote`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::csp::{self, CspReport};

/// One client-reported occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "Time")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "Remote")]
    remote: String,
    #[serde(rename = "UserAgent", default, skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
    #[serde(flatten)]
    record: Record,
}

/// Endpoint-specific payload, tagged by `Kind` in the persisted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Kind", rename_all = "lowercase")]
pub enum Record {
    Form(FormRecord),
    Beacon(BeaconRecord),
    Json {
        #[serde(rename = "Data")]
        data: serde_json::Value,
    },
    Csp {
        #[serde(rename = "Report")]
        report: CspReport,
    },
}

/// Free-text navigation record submitted through `/form` or `/api`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FormRecord {
    pub trigger: String,
    pub src: String,
    pub dst: String,
    pub dur: String,
}

/// Page timing record submitted through `/beacon`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconRecord {
    #[serde(rename = "DurationMs")]
    pub duration_ms: u64,
    #[serde(rename = "SrcPage")]
    pub src_page: String,
    #[serde(rename = "DstPage")]
    pub dst_page: String,
    #[serde(rename = "Referrer")]
    pub referrer: String,
}

impl Event {
    /// Build an event stamped with the current time.
    pub fn new(remote: impl Into<String>, user_agent: Option<String>, record: Record) -> Self {
        Self::at(Utc::now(), remote, user_agent, record)
    }

    /// Build an event with an explicit receive time.
    pub fn at(
        timestamp: DateTime<Utc>,
        remote: impl Into<String>,
        user_agent: Option<String>,
        record: Record,
    ) -> Self {
        Self {
            timestamp,
            remote: remote.into(),
            user_agent,
            record,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Short label of the record kind (`form`, `beacon`, `json`, `csp`).
    pub fn kind(&self) -> &'static str {
        self.record.kind()
    }

    /// One-line human summary used as the log message for accepted events.
    pub fn summary(&self) -> String {
        match &self.record {
            Record::Csp { report } => report.summary(),
            Record::Form(f) if !f.trigger.is_empty() => format!("viewed {} for {}", f.src, f.dur),
            Record::Beacon(b) => format!("viewed {} for {}ms", b.src_page, b.duration_ms),
            Record::Json { data } => match data.get("csp-report") {
                Some(serde_json::Value::Object(m)) => csp::summarize(m),
                _ => "received".to_string(),
            },
            Record::Form(_) => "received".to_string(),
        }
    }
}

impl Record {
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Form(_) => "form",
            Record::Beacon(_) => "beacon",
            Record::Json { .. } => "json",
            Record::Csp { .. } => "csp",
        }
    }
}
