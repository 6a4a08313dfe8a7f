//! The indexing hook.

use std::sync::Arc;

use async_trait::async_trait;
use log_indexer_repository::IndexBackend;
use log_indexer_shared::{Entry, Level, LogEnvelope};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::errors::HookError;
use crate::facility::Hook;
use crate::indexing::cleanup::{IndexCleanup, IndexSet, NoCleanup};
use crate::indexing::naming::{FixedIndex, IndexNamer};

/// Document kind every envelope is written with.
pub const DOCUMENT_KIND: &str = "log";

/// Hook that indexes every entry it receives as a [`LogEnvelope`].
///
/// The backend is shared with the caller and never closed by the hook.
/// Every backend call is bound to the hook's cancellation token; after
/// [`cancel`](Self::cancel) all further writes fail.
///
/// # Example
///
/// ```ignore
/// let backend = Arc::new(OpenSearchBackend::new(url, IndexSettings::default()).await?);
/// let hook = IndexingHook::with_func(
///     backend,
///     "web-01",
///     Level::Info,
///     DailyIndex::new("app-logs"),
///     KeepRecent::new(7),
/// )
/// .await?;
///
/// let logger = Logger::new(Level::Debug);
/// logger.add_hook(Arc::new(hook));
/// logger.with_field("user", "ada").info("signed in").await;
/// ```
pub struct IndexingHook {
    backend: Arc<dyn IndexBackend>,
    host: String,
    namer: Box<dyn IndexNamer>,
    cleanup: Box<dyn IndexCleanup>,
    provisioned: Mutex<IndexSet>,
    levels: Vec<Level>,
    cancel: CancellationToken,
}

impl IndexingHook {
    /// Create a hook writing every entry to the fixed index `index`.
    ///
    /// # Arguments
    ///
    /// * `backend` - Search backend, shared with the caller
    /// * `host` - Host name recorded in every envelope
    /// * `level` - Least severe level the hook receives
    /// * `index` - Name of the index
    ///
    /// # Returns
    ///
    /// * `Ok(IndexingHook)` - Once `index` is known to exist
    /// * `Err(HookError)` - If the index could not be checked or created
    pub async fn new(
        backend: Arc<dyn IndexBackend>,
        host: impl Into<String>,
        level: Level,
        index: impl Into<String>,
    ) -> Result<Self, HookError> {
        Self::with_func(backend, host, level, FixedIndex::new(index), NoCleanup).await
    }

    /// Create a hook with dynamic index naming and a cleanup callback.
    ///
    /// `namer` is called for every entry. `cleanup` is called once after each
    /// index the hook provisions, with the full set of provisioned names.
    /// The index `namer` returns now is provisioned before this returns.
    pub async fn with_func(
        backend: Arc<dyn IndexBackend>,
        host: impl Into<String>,
        level: Level,
        namer: impl IndexNamer + 'static,
        cleanup: impl IndexCleanup + 'static,
    ) -> Result<Self, HookError> {
        Self::with_func_in_scope(
            backend,
            host,
            level,
            namer,
            cleanup,
            &CancellationToken::new(),
        )
        .await
    }

    /// Like [`with_func`](Self::with_func), with the hook's token derived from
    /// `scope`. Cancelling `scope` cancels the hook; cancelling the hook
    /// leaves `scope` untouched.
    pub async fn with_func_in_scope(
        backend: Arc<dyn IndexBackend>,
        host: impl Into<String>,
        level: Level,
        namer: impl IndexNamer + 'static,
        cleanup: impl IndexCleanup + 'static,
        scope: &CancellationToken,
    ) -> Result<Self, HookError> {
        let hook = Self {
            backend,
            host: host.into(),
            namer: Box::new(namer),
            cleanup: Box::new(cleanup),
            provisioned: Mutex::new(IndexSet::new()),
            levels: Level::up_to(level),
            cancel: scope.child_token(),
        };

        let index = hook.get_or_create_index().await?;

        info!(
            host = %hook.host,
            index = %index,
            level = %level,
            "Created indexing hook"
        );

        Ok(hook)
    }

    /// Resolve the current index name, provisioning the index on first use.
    ///
    /// A name already in the provisioned set is returned without any backend
    /// call and without invoking the cleanup callback. Provisioning runs under
    /// the set's lock, so concurrent callers never provision the same name
    /// twice.
    pub async fn get_or_create_index(&self) -> Result<String, HookError> {
        let index = self.namer.index_name();

        let mut provisioned = self.provisioned.lock().await;
        if provisioned.contains(&index) {
            return Ok(index);
        }

        let exists = self.backend.index_exists(&index, &self.cancel).await?;
        if !exists {
            let created = self.backend.create_index(&index, &self.cancel).await?;
            if !created.acknowledged {
                return Err(HookError::cannot_create_index(index));
            }
        }

        provisioned.insert(index.clone());
        self.cleanup.clean_up(&mut provisioned);

        debug!(index = %index, created = !exists, "Index provisioned");
        Ok(index)
    }

    /// Cancel every in-flight and future backend call made by this hook.
    ///
    /// Calling this more than once has no further effect.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`cancel`](Self::cancel) was called or the parent scope was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Host recorded in every envelope.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Currently remembered index names, sorted.
    pub async fn provisioned_indices(&self) -> Vec<String> {
        let mut names: Vec<String> = self.provisioned.lock().await.iter().cloned().collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl Hook for IndexingHook {
    fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[instrument(skip_all, fields(level = %entry.level))]
    async fn fire(&self, entry: &Entry) -> Result<(), HookError> {
        let index = self.get_or_create_index().await?;

        let envelope = LogEnvelope::from_entry(&self.host, entry);
        let body = serde_json::to_value(&envelope)?;

        self.backend
            .index_document(&index, DOCUMENT_KIND, &body, &self.cancel)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::Logger;
    use crate::indexing::KeepRecent;
    use chrono::{TimeZone, Utc};
    use log_indexer_repository::{BackendError, CreateIndexResponse, IndexDocumentResponse};
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Mock backend recording every call.
    #[derive(Default)]
    struct MockBackend {
        existing: StdMutex<HashSet<String>>,
        exists_calls: AtomicUsize,
        create_calls: AtomicUsize,
        documents: StdMutex<Vec<(String, String, Value)>>,
        fail_exists: bool,
        fail_create: bool,
        fail_index: bool,
        unacknowledged: bool,
    }

    impl MockBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn with_existing(names: &[&str]) -> Arc<Self> {
            let backend = Self::default();
            backend
                .existing
                .lock()
                .unwrap()
                .extend(names.iter().map(|n| n.to_string()));
            Arc::new(backend)
        }

        fn exists_calls(&self) -> usize {
            self.exists_calls.load(Ordering::SeqCst)
        }

        fn create_calls(&self) -> usize {
            self.create_calls.load(Ordering::SeqCst)
        }

        fn documents(&self) -> Vec<(String, String, Value)> {
            self.documents.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IndexBackend for MockBackend {
        async fn index_exists(
            &self,
            index: &str,
            cancel: &CancellationToken,
        ) -> Result<bool, BackendError> {
            if cancel.is_cancelled() {
                return Err(BackendError::Cancelled);
            }
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            // Give concurrent callers a chance to interleave.
            tokio::task::yield_now().await;
            if self.fail_exists {
                return Err(BackendError::query("Mock failure"));
            }
            Ok(self.existing.lock().unwrap().contains(index))
        }

        async fn create_index(
            &self,
            index: &str,
            cancel: &CancellationToken,
        ) -> Result<CreateIndexResponse, BackendError> {
            if cancel.is_cancelled() {
                return Err(BackendError::Cancelled);
            }
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(BackendError::index_creation("Mock create failure"));
            }
            if self.unacknowledged {
                return Ok(CreateIndexResponse::unacknowledged(index));
            }
            self.existing.lock().unwrap().insert(index.to_string());
            Ok(CreateIndexResponse::acknowledged(index))
        }

        async fn index_document(
            &self,
            index: &str,
            kind: &str,
            body: &Value,
            cancel: &CancellationToken,
        ) -> Result<IndexDocumentResponse, BackendError> {
            if cancel.is_cancelled() {
                return Err(BackendError::Cancelled);
            }
            if self.fail_index {
                return Err(BackendError::index("Mock index failure"));
            }
            let mut documents = self.documents.lock().unwrap();
            documents.push((index.to_string(), kind.to_string(), body.clone()));
            Ok(IndexDocumentResponse {
                index: index.to_string(),
                id: documents.len().to_string(),
                result: "created".to_string(),
            })
        }
    }

    /// Namer whose answer the test can change.
    fn switchable_namer(initial: &str) -> (Arc<StdMutex<String>>, impl IndexNamer) {
        let current = Arc::new(StdMutex::new(initial.to_string()));
        let handle = Arc::clone(&current);
        (handle, move || current.lock().unwrap().clone())
    }

    /// Cleanup that counts its invocations.
    fn counting_cleanup() -> (Arc<AtomicUsize>, impl IndexCleanup) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&calls);
        (handle, move |_: &mut IndexSet| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_levels_match_threshold() {
        for threshold in Level::ALL {
            let hook = IndexingHook::new(MockBackend::new(), "h1", threshold, "logs")
                .await
                .unwrap();

            let expected: Vec<Level> = Level::ALL
                .iter()
                .copied()
                .filter(|l| *l <= threshold)
                .collect();
            assert_eq!(hook.levels(), expected.as_slice());
        }
    }

    #[tokio::test]
    async fn test_construction_provisions_missing_index() {
        let backend = MockBackend::new();

        let hook = IndexingHook::new(backend.clone(), "h1", Level::Debug, "logs")
            .await
            .unwrap();

        assert_eq!(backend.exists_calls(), 1);
        assert_eq!(backend.create_calls(), 1);
        assert_eq!(hook.provisioned_indices().await, vec!["logs".to_string()]);
    }

    #[tokio::test]
    async fn test_existing_index_is_not_created() {
        let backend = MockBackend::with_existing(&["logs"]);

        IndexingHook::new(backend.clone(), "h1", Level::Debug, "logs")
            .await
            .unwrap();

        assert_eq!(backend.exists_calls(), 1);
        assert_eq!(backend.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let backend = MockBackend::new();
        let hook = IndexingHook::new(backend.clone(), "h1", Level::Debug, "logs")
            .await
            .unwrap();

        assert_eq!(hook.get_or_create_index().await.unwrap(), "logs");
        assert_eq!(hook.get_or_create_index().await.unwrap(), "logs");

        assert_eq!(backend.exists_calls(), 1);
        assert_eq!(backend.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_fire_writes_envelope() {
        let backend = MockBackend::new();
        let hook = IndexingHook::new(backend.clone(), "h1", Level::Debug, "logs")
            .await
            .unwrap();

        let time = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(42);
        let entry = Entry::new(Level::Info, "m")
            .with_time(time)
            .with_field("k", "v");

        hook.fire(&entry).await.unwrap();

        let documents = backend.documents();
        assert_eq!(documents.len(), 1);
        let (index, kind, body) = &documents[0];
        assert_eq!(index, "logs");
        assert_eq!(kind, DOCUMENT_KIND);
        assert_eq!(
            body,
            &json!({
                "Host": "h1",
                "Timestamp": "2024-03-01T10:00:00.000000042Z",
                "Message": "m",
                "Data": { "k": "v" },
                "Level": "INFO"
            })
        );
    }

    #[tokio::test]
    async fn test_cleanup_called_once_per_new_index() {
        let backend = MockBackend::new();
        let (name, namer) = switchable_namer("idx1");
        let (cleanups, cleanup) = counting_cleanup();

        let hook = IndexingHook::with_func(backend.clone(), "h1", Level::Debug, namer, cleanup)
            .await
            .unwrap();
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);

        hook.fire(&Entry::new(Level::Info, "a")).await.unwrap();
        hook.fire(&Entry::new(Level::Info, "b")).await.unwrap();
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);

        *name.lock().unwrap() = "idx2".to_string();
        hook.fire(&Entry::new(Level::Info, "c")).await.unwrap();
        hook.fire(&Entry::new(Level::Info, "d")).await.unwrap();
        assert_eq!(cleanups.load(Ordering::SeqCst), 2);

        let indices: Vec<String> = backend.documents().into_iter().map(|d| d.0).collect();
        assert_eq!(indices, vec!["idx1", "idx1", "idx2", "idx2"]);
        assert_eq!(backend.exists_calls(), 2);
    }

    #[tokio::test]
    async fn test_cleanup_eviction_forces_revalidation() {
        let backend = MockBackend::new();
        let (name, namer) = switchable_namer("logs-2024.01.01");

        let hook =
            IndexingHook::with_func(backend.clone(), "h1", Level::Debug, namer, KeepRecent::new(1))
                .await
                .unwrap();

        *name.lock().unwrap() = "logs-2024.01.02".to_string();
        hook.get_or_create_index().await.unwrap();
        assert_eq!(
            hook.provisioned_indices().await,
            vec!["logs-2024.01.02".to_string()]
        );

        // The evicted day is checked again when it comes back.
        *name.lock().unwrap() = "logs-2024.01.01".to_string();
        hook.get_or_create_index().await.unwrap();
        assert_eq!(backend.exists_calls(), 3);
        assert_eq!(backend.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_unacknowledged_creation_fails() {
        let backend = Arc::new(MockBackend {
            unacknowledged: true,
            ..Default::default()
        });

        let result = IndexingHook::new(backend.clone(), "h1", Level::Debug, "logs").await;

        match result {
            Err(HookError::CannotCreateIndex(index)) => assert_eq!(index, "logs"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("construction should fail"),
        }
    }

    #[tokio::test]
    async fn test_unacknowledged_creation_leaves_set_unchanged() {
        let backend = Arc::new(MockBackend {
            unacknowledged: true,
            ..Default::default()
        });
        backend.existing.lock().unwrap().insert("idx1".to_string());
        let (name, namer) = switchable_namer("idx1");
        let (cleanups, cleanup) = counting_cleanup();

        let hook = IndexingHook::with_func(backend.clone(), "h1", Level::Debug, namer, cleanup)
            .await
            .unwrap();

        *name.lock().unwrap() = "idx2".to_string();
        let result = hook.fire(&Entry::new(Level::Info, "m")).await;

        assert!(matches!(result, Err(HookError::CannotCreateIndex(_))));
        assert_eq!(hook.provisioned_indices().await, vec!["idx1".to_string()]);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        assert!(backend.documents().is_empty());
    }

    #[tokio::test]
    async fn test_construction_fails_when_existence_check_fails() {
        let backend = Arc::new(MockBackend {
            fail_exists: true,
            ..Default::default()
        });

        let fixed = IndexingHook::new(backend.clone(), "h1", Level::Debug, "logs").await;
        let dynamic = IndexingHook::with_func(
            backend.clone(),
            "h1",
            Level::Debug,
            || "logs".to_string(),
            NoCleanup,
        )
        .await;

        assert!(matches!(
            fixed,
            Err(HookError::Backend(BackendError::QueryError(_)))
        ));
        assert!(matches!(
            dynamic,
            Err(HookError::Backend(BackendError::QueryError(_)))
        ));
        assert_eq!(backend.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_failure_is_surfaced_unchanged() {
        let backend = Arc::new(MockBackend {
            fail_create: true,
            ..Default::default()
        });
        let (cleanups, cleanup) = counting_cleanup();

        let result = IndexingHook::with_func(
            backend.clone(),
            "h1",
            Level::Debug,
            || "logs".to_string(),
            cleanup,
        )
        .await;

        match result {
            Err(HookError::Backend(BackendError::IndexCreationError(msg))) => {
                assert_eq!(msg, "Mock create failure")
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("construction should fail"),
        }
        assert_eq!(backend.create_calls(), 1);
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_failure_after_construction_leaves_set_unchanged() {
        let backend = Arc::new(MockBackend {
            fail_create: true,
            ..Default::default()
        });
        backend.existing.lock().unwrap().insert("idx1".to_string());
        let (name, namer) = switchable_namer("idx1");
        let (cleanups, cleanup) = counting_cleanup();

        let hook = IndexingHook::with_func(backend.clone(), "h1", Level::Debug, namer, cleanup)
            .await
            .unwrap();

        *name.lock().unwrap() = "idx2".to_string();
        let result = hook.fire(&Entry::new(Level::Info, "m")).await;

        assert!(matches!(
            result,
            Err(HookError::Backend(BackendError::IndexCreationError(_)))
        ));
        assert_eq!(hook.provisioned_indices().await, vec!["idx1".to_string()]);
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
        assert!(backend.documents().is_empty());
    }

    #[tokio::test]
    async fn test_fire_passes_index_error_through() {
        let backend = Arc::new(MockBackend {
            fail_index: true,
            ..Default::default()
        });
        let hook = IndexingHook::new(backend.clone(), "h1", Level::Debug, "logs")
            .await
            .unwrap();

        let result = hook.fire(&Entry::new(Level::Info, "m")).await;

        match result {
            Err(HookError::Backend(BackendError::IndexError(msg))) => {
                assert_eq!(msg, "Mock index failure")
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(()) => panic!("fire should fail"),
        }
        assert!(!hook.is_cancelled());
    }

    #[tokio::test]
    async fn test_fire_fails_after_cancel() {
        let backend = MockBackend::new();
        let hook = IndexingHook::new(backend.clone(), "h1", Level::Debug, "logs")
            .await
            .unwrap();

        hook.fire(&Entry::new(Level::Info, "before")).await.unwrap();
        hook.cancel();
        hook.cancel();

        let result = hook.fire(&Entry::new(Level::Info, "after")).await;

        assert!(hook.is_cancelled());
        assert!(result.as_ref().is_err_and(HookError::is_cancelled));
        assert_eq!(backend.documents().len(), 1);
    }

    #[tokio::test]
    async fn test_parent_scope_cancels_hook() {
        let scope = CancellationToken::new();
        let hook = IndexingHook::with_func_in_scope(
            MockBackend::new(),
            "h1",
            Level::Debug,
            FixedIndex::new("logs"),
            NoCleanup,
            &scope,
        )
        .await
        .unwrap();

        scope.cancel();

        assert!(hook.is_cancelled());
        assert!(hook.fire(&Entry::new(Level::Info, "m")).await.is_err());
    }

    #[tokio::test]
    async fn test_cancelling_hook_leaves_scope_alive() {
        let scope = CancellationToken::new();
        let hook = IndexingHook::with_func_in_scope(
            MockBackend::new(),
            "h1",
            Level::Debug,
            FixedIndex::new("logs"),
            NoCleanup,
            &scope,
        )
        .await
        .unwrap();

        hook.cancel();

        assert!(!scope.is_cancelled());
    }

    #[tokio::test]
    async fn test_concurrent_first_use_provisions_once() {
        let backend = MockBackend::new();
        let (name, namer) = switchable_namer("idx1");
        let hook = Arc::new(
            IndexingHook::with_func(backend.clone(), "h1", Level::Debug, namer, NoCleanup)
                .await
                .unwrap(),
        );

        *name.lock().unwrap() = "idx2".to_string();
        let fires = (0..16).map(|i| {
            let hook = Arc::clone(&hook);
            async move { hook.fire(&Entry::new(Level::Info, format!("m{}", i))).await }
        });
        let results = futures::future::join_all(fires).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(backend.exists_calls(), 2);
        assert_eq!(backend.create_calls(), 2);
        assert_eq!(backend.documents().len(), 16);
    }

    #[tokio::test]
    async fn test_end_to_end_through_logger() {
        let backend = MockBackend::new();
        let hook = IndexingHook::with_func(
            backend.clone(),
            "localhost",
            Level::Debug,
            || "idx1".to_string(),
            |_: &mut IndexSet| {},
        )
        .await
        .unwrap();

        let logger = Logger::new(Level::Debug);
        logger.add_hook(Arc::new(hook));

        for i in 0..100 {
            logger.with_field("n", i).info(format!("msg {}", i)).await;
        }

        let documents = backend.documents();
        assert_eq!(backend.exists_calls(), 1);
        assert!(backend.create_calls() <= 1);
        assert_eq!(documents.len(), 100);
        assert!(documents
            .iter()
            .all(|(index, _, body)| index == "idx1" && body["Host"] == "localhost"));
        assert!(documents.iter().all(|(_, _, body)| body["Level"] == "INFO"));
    }
}
