//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `IndexBackend`
//! using the OpenSearch Rust client.

use std::future::Future;

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesRefreshParts},
    CountParts, IndexParts, OpenSearch,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use url::Url;

use crate::errors::BackendError;
use crate::interfaces::IndexBackend;
use crate::opensearch::index_config::IndexSettings;
use crate::types::{CreateIndexResponse, IndexDocumentResponse};

/// OpenSearch backend implementation.
///
/// OpenSearch has no mapping types, so the document kind passed to
/// [`IndexBackend::index_document`] is only recorded in traces; documents are
/// written through the typeless `/{index}/_doc` endpoint.
///
/// # Example
///
/// ```ignore
/// let backend = OpenSearchBackend::new("http://localhost:9200", IndexSettings::default()).await?;
/// let cancel = CancellationToken::new();
/// if !backend.index_exists("logs", &cancel).await? {
///     backend.create_index("logs", &cancel).await?;
/// }
/// ```
pub struct OpenSearchBackend {
    client: OpenSearch,
    settings: IndexSettings,
}

impl OpenSearchBackend {
    /// Create a new OpenSearch backend connected to the specified URL.
    ///
    /// No request is made; connectivity problems surface on the first call.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `settings` - Settings applied to indices this backend creates
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchBackend)` - A new backend instance
    /// * `Err(BackendError)` - If the URL is invalid or the transport cannot be built
    pub async fn new(url: &str, settings: IndexSettings) -> Result<Self, BackendError> {
        let parsed_url = Url::parse(url).map_err(|e| BackendError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| BackendError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            shards = settings.number_of_shards,
            replicas = settings.number_of_replicas,
            "Created OpenSearch backend"
        );

        Ok(Self { client, settings })
    }

    /// Make all recently indexed documents in `index` visible to search.
    pub async fn refresh(&self, index: &str, cancel: &CancellationToken) -> Result<(), BackendError> {
        let request = async {
            let response = self
                .client
                .indices()
                .refresh(IndicesRefreshParts::Index(&[index]))
                .send()
                .await
                .map_err(|e| BackendError::query(e.to_string()))?;

            let status = response.status_code();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::query(format!(
                    "Refresh failed with status {}: {}",
                    status, body
                )));
            }
            Ok(())
        };

        cancellable(cancel, request).await
    }

    /// Count documents in `index` whose `field` exactly matches `value`.
    pub async fn count_matching(
        &self,
        index: &str,
        field: &str,
        value: &str,
        cancel: &CancellationToken,
    ) -> Result<u64, BackendError> {
        let request = async {
            let response = self
                .client
                .count(CountParts::Index(&[index]))
                .body(json!({
                    "query": {
                        "term": { field: value }
                    }
                }))
                .send()
                .await
                .map_err(|e| BackendError::query(e.to_string()))?;

            let status = response.status_code();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::query(format!(
                    "Count failed with status {}: {}",
                    status, body
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| BackendError::parse(e.to_string()))?;

            body["count"]
                .as_u64()
                .ok_or_else(|| BackendError::parse("Count response is missing `count`"))
        };

        cancellable(cancel, request).await
    }
}

#[async_trait]
impl IndexBackend for OpenSearchBackend {
    /// `HEAD /{index}`: 200 means the index exists, 404 means it does not.
    #[instrument(skip(self, cancel))]
    async fn index_exists(
        &self,
        index: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, BackendError> {
        let request = async {
            let response = self
                .client
                .indices()
                .exists(IndicesExistsParts::Index(&[index]))
                .send()
                .await
                .map_err(|e| BackendError::query(e.to_string()))?;

            match response.status_code().as_u16() {
                200 => Ok(true),
                404 => Ok(false),
                status => Err(BackendError::query(format!(
                    "Index existence check failed with status {}",
                    status
                ))),
            }
        };

        let exists = cancellable(cancel, request).await?;
        debug!(index = %index, exists, "Checked index existence");
        Ok(exists)
    }

    /// `PUT /{index}` with the configured settings and envelope mappings.
    #[instrument(skip(self, cancel))]
    async fn create_index(
        &self,
        index: &str,
        cancel: &CancellationToken,
    ) -> Result<CreateIndexResponse, BackendError> {
        let request = async {
            let response = self
                .client
                .indices()
                .create(IndicesCreateParts::Index(index))
                .body(self.settings.to_body())
                .send()
                .await
                .map_err(|e| BackendError::index_creation(e.to_string()))?;

            let status = response.status_code();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::index_creation(format!(
                    "Create index failed with status {}: {}",
                    status, body
                )));
            }

            response
                .json::<CreateIndexResponse>()
                .await
                .map_err(|e| BackendError::parse(e.to_string()))
        };

        let created = cancellable(cancel, request).await?;
        info!(
            index = %index,
            acknowledged = created.acknowledged,
            "Create index request completed"
        );
        Ok(created)
    }

    /// `POST /{index}/_doc`.
    #[instrument(skip(self, body, cancel))]
    async fn index_document(
        &self,
        index: &str,
        kind: &str,
        body: &Value,
        cancel: &CancellationToken,
    ) -> Result<IndexDocumentResponse, BackendError> {
        let request = async {
            let response = self
                .client
                .index(IndexParts::Index(index))
                .body(body)
                .send()
                .await
                .map_err(|e| BackendError::index(e.to_string()))?;

            let status = response.status_code();
            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                return Err(BackendError::index(format!(
                    "Index request failed with status {}: {}",
                    status, error_body
                )));
            }

            response
                .json::<IndexDocumentResponse>()
                .await
                .map_err(|e| BackendError::parse(e.to_string()))
        };

        let indexed = cancellable(cancel, request).await?;
        debug!(index = %index, id = %indexed.id, "Document indexed");
        Ok(indexed)
    }
}

/// Run `request` unless `cancel` fires first.
///
/// An already-cancelled token wins without polling the request at all.
async fn cancellable<T, F>(cancel: &CancellationToken, request: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BackendError::Cancelled),
        result = request => result,
    }
}
