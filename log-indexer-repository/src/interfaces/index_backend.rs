//! Index backend trait definition.
//!
//! This module defines the abstract interface for the index management and
//! document indexing operations the log hook needs, allowing for different
//! backend implementations (OpenSearch, Elasticsearch, mocks).

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::errors::BackendError;
use crate::types::{CreateIndexResponse, IndexDocumentResponse};

/// Abstract interface for search backend operations.
///
/// Every call takes the caller's cancellation token. Implementations must
/// return [`BackendError::Cancelled`] once the token is cancelled instead of
/// completing the request.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a single backend can be
/// shared by every task that logs.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Check whether an index exists.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index
    /// * `cancel` - Token that aborts the request when cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(true)` / `Ok(false)` - Whether the index exists
    /// * `Err(BackendError)` - If the check could not be executed
    async fn index_exists(
        &self,
        index: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, BackendError>;

    /// Create an index.
    ///
    /// An `Ok` response whose `acknowledged` flag is false means the backend
    /// accepted the request but did not confirm the creation.
    async fn create_index(
        &self,
        index: &str,
        cancel: &CancellationToken,
    ) -> Result<CreateIndexResponse, BackendError>;

    /// Index a single document.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index
    /// * `kind` - Document kind (mapping type on backends that still have one)
    /// * `body` - The JSON document
    /// * `cancel` - Token that aborts the request when cancelled
    async fn index_document(
        &self,
        index: &str,
        kind: &str,
        body: &Value,
        cancel: &CancellationToken,
    ) -> Result<IndexDocumentResponse, BackendError>;
}
