//! Indexing hook: writes log entries into a search backend.
//!
//! Target indices are provisioned lazily: the first time a name is resolved
//! the hook checks it exists (creating it if needed) and remembers it, so
//! later entries for the same index cost a single document write.

mod cleanup;
mod hook;
mod naming;

pub use cleanup::{IndexCleanup, IndexSet, KeepRecent, NoCleanup};
pub use hook::{IndexingHook, DOCUMENT_KIND};
pub use naming::{DailyIndex, FixedIndex, IndexNamer};
