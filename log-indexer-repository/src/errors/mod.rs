//! Error types for the log indexer repository.

mod backend_error;

pub use backend_error::BackendError;
