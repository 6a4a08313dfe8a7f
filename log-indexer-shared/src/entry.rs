//! Log entries as produced by the logging facility.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::Level;

/// Structured key/value data attached to an entry.
pub type Fields = BTreeMap<String, Value>;

/// A single log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// When the entry was created.
    pub time: DateTime<Utc>,
    /// Severity of the entry.
    pub level: Level,
    /// Free-text message.
    pub message: String,
    /// Structured fields.
    pub data: Fields,
}

impl Entry {
    /// Create an entry stamped with the current time and no fields.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            data: Fields::new(),
        }
    }

    /// Override the entry time.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Attach a single field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Attach several fields, replacing existing keys.
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.data.extend(fields);
        self
    }
}
