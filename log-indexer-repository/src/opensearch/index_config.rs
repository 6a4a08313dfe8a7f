//! OpenSearch index settings and mappings.
//!
//! This module defines the body sent when a log index is created.

use serde_json::{json, Value};

/// Settings applied to every log index the backend creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSettings {
    /// Primary shard count.
    pub number_of_shards: u32,
    /// Replica count.
    pub number_of_replicas: u32,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

impl IndexSettings {
    /// Create settings with the given shard and replica counts.
    pub fn new(number_of_shards: u32, number_of_replicas: u32) -> Self {
        Self {
            number_of_shards,
            number_of_replicas,
        }
    }

    /// Build the create-index request body.
    ///
    /// The mappings cover the log envelope:
    /// - **Host**, **Level**: keyword, for exact filtering
    /// - **Timestamp**: `date_nanos`, the envelope carries nanosecond precision
    /// - **Message**: full text
    /// - **Data**: dynamic object, fields are mapped as they first appear
    pub fn to_body(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            },
            "mappings": {
                "properties": {
                    "Host": {
                        "type": "keyword"
                    },
                    "Level": {
                        "type": "keyword"
                    },
                    "Timestamp": {
                        "type": "date_nanos"
                    },
                    "Message": {
                        "type": "text"
                    },
                    "Data": {
                        "type": "object",
                        "dynamic": true
                    }
                }
            }
        })
    }
}
