//! Response types for backend operations.

use serde::Deserialize;

/// Result of a create-index call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateIndexResponse {
    /// Whether the backend confirmed the index was created.
    pub acknowledged: bool,
    /// Whether the required shard copies started before the request timed out.
    #[serde(default)]
    pub shards_acknowledged: bool,
    /// Name of the created index.
    #[serde(default)]
    pub index: String,
}

impl CreateIndexResponse {
    /// An acknowledged response for `index`.
    pub fn acknowledged(index: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            shards_acknowledged: true,
            index: index.into(),
        }
    }

    /// A response the backend did not acknowledge.
    pub fn unacknowledged(index: impl Into<String>) -> Self {
        Self {
            acknowledged: false,
            shards_acknowledged: false,
            index: index.into(),
        }
    }
}

/// Result of indexing a single document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexDocumentResponse {
    /// Index the document was written to.
    #[serde(rename = "_index")]
    pub index: String,
    /// Identifier assigned by the backend.
    #[serde(rename = "_id")]
    pub id: String,
    /// Outcome reported by the backend, usually `created`.
    #[serde(default)]
    pub result: String,
}
