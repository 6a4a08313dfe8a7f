//! # Log Indexer Hook
//!
//! This crate connects an application's logging facility to a search backend.
//!
//! ## Architecture
//!
//! 1. **Facility**: the `Logger` builds entries and dispatches them to every
//!    registered `Hook` whose levels include the entry's level
//! 2. **IndexingHook**: resolves the target index, provisions it on first
//!    use, and writes one envelope document per entry
//! 3. **Backend**: any `IndexBackend`, usually `OpenSearchBackend`

pub mod errors;
pub mod facility;
pub mod indexing;

pub use errors::HookError;
pub use facility::{EntryBuilder, Hook, LevelHooks, Logger};
pub use indexing::{
    DailyIndex, FixedIndex, IndexCleanup, IndexNamer, IndexSet, IndexingHook, KeepRecent,
    NoCleanup, DOCUMENT_KIND,
};
pub use log_indexer_shared::{Entry, Fields, Level, LogEnvelope};
