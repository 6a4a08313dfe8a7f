//! # Log Indexer Repository
//!
//! This crate provides the backend interface the log indexing hook writes
//! through, the errors it can produce, and a concrete implementation for
//! OpenSearch (also compatible with Elasticsearch 7+ document APIs).

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use errors::BackendError;
pub use interfaces::IndexBackend;
pub use opensearch::{IndexSettings, OpenSearchBackend};
pub use types::{CreateIndexResponse, IndexDocumentResponse};
