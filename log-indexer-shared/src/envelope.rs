//! The document written to the search backend for every log entry.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{Entry, Fields};

/// Fixed-shape document indexed per log entry.
///
/// Field names are serialized in PascalCase (`Host`, `Timestamp`, `Message`,
/// `Data`, `Level`) and must not change: existing index mappings and
/// dashboards query them by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogEnvelope {
    /// Host the entry originated from.
    pub host: String,
    /// Entry time, UTC, RFC 3339 with up to nanosecond precision.
    pub timestamp: String,
    /// Message copied verbatim.
    pub message: String,
    /// Structured fields copied verbatim.
    pub data: Fields,
    /// Uppercased level name, e.g. `INFO`.
    pub level: String,
}

impl LogEnvelope {
    /// Build the envelope for `entry` as emitted by `host`.
    pub fn from_entry(host: &str, entry: &Entry) -> Self {
        Self {
            host: host.to_string(),
            timestamp: format_rfc3339_nano(&entry.time),
            message: entry.message.clone(),
            data: entry.data.clone(),
            level: entry.level.as_str().to_uppercase(),
        }
    }
}

/// Format `time` as UTC RFC 3339 with nanoseconds, trailing zeros of the
/// fraction removed (`2024-03-01T10:00:00.5Z`, `2024-03-01T10:00:00Z`).
pub fn format_rfc3339_nano(time: &DateTime<Utc>) -> String {
    let full = time.to_rfc3339_opts(SecondsFormat::Nanos, true);

    // `full` always ends in `.NNNNNNNNNZ`
    let Some((seconds, fraction)) = full.split_once('.') else {
        return full;
    };
    let digits = fraction.trim_end_matches('Z').trim_end_matches('0');
    if digits.is_empty() {
        format!("{}Z", seconds)
    } else {
        format!("{}.{}Z", seconds, digits)
    }
}
