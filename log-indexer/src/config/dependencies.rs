//! Dependency initialization and wiring for the log indexer.

use std::sync::Arc;

use log_indexer_hook::{
    DailyIndex, FixedIndex, IndexCleanup, IndexNamer, IndexSet, IndexingHook, KeepRecent, Logger,
    NoCleanup,
};
use log_indexer_repository::OpenSearchBackend;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{IndexRotation, Settings};
use crate::AppError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Backend shared with the hook; kept for direct queries.
    pub backend: Arc<OpenSearchBackend>,
    /// The registered indexing hook.
    pub hook: Arc<IndexingHook>,
    /// Logger with the hook attached.
    pub logger: Arc<Logger>,
    /// Cancelling this cancels every backend call the hook makes.
    pub shutdown: CancellationToken,
}

impl Dependencies {
    /// Initialize all dependencies from `settings`.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Once the first target index is known to exist
    /// * `Err(AppError)` - If the backend cannot be reached or the index cannot be created
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            host = %settings.host,
            index = %settings.index,
            rotation = ?settings.rotation,
            "Initializing dependencies"
        );

        let backend = Arc::new(
            OpenSearchBackend::new(&settings.opensearch_url, settings.index_settings)
                .await
                .map_err(|e| AppError::config(format!("Failed to create OpenSearch backend: {}", e)))?,
        );

        let namer: Box<dyn IndexNamer> = match settings.rotation {
            IndexRotation::Fixed => Box::new(FixedIndex::new(settings.index.clone())),
            IndexRotation::Daily => Box::new(DailyIndex::new(settings.index.clone())),
        };
        let cleanup: Box<dyn IndexCleanup> = match settings.keep_indices {
            Some(max) => Box::new(KeepRecent::new(max)),
            None => Box::new(NoCleanup),
        };

        let shutdown = CancellationToken::new();
        let hook = IndexingHook::with_func_in_scope(
            backend.clone(),
            settings.host.clone(),
            settings.level,
            move || namer.index_name(),
            move |provisioned: &mut IndexSet| cleanup.clean_up(provisioned),
            &shutdown,
        )
        .await?;
        let hook = Arc::new(hook);

        info!("Indexing hook ready");

        let logger = Arc::new(Logger::new(settings.level));
        logger.add_hook(hook.clone());

        Ok(Self {
            backend,
            hook,
            logger,
            shutdown,
        })
    }
}
