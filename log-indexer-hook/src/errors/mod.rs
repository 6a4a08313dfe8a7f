//! Error types for the log indexer hook.

use log_indexer_repository::BackendError;
use thiserror::Error;

/// Errors returned by hooks and by hook construction.
#[derive(Error, Debug)]
pub enum HookError {
    /// The backend answered the create-index request without acknowledging it.
    #[error("Cannot create index: {0}")]
    CannotCreateIndex(String),

    /// Error from the search backend, passed through unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The envelope could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl HookError {
    /// Create a cannot-create-index error for `index`.
    pub fn cannot_create_index(index: impl Into<String>) -> Self {
        Self::CannotCreateIndex(index.into())
    }

    /// Whether the underlying backend call was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Backend(e) if e.is_cancelled())
    }
}
