//! The logging facility hooks attach to.
//!
//! A [`Logger`] turns log calls into [`Entry`](log_indexer_shared::Entry)
//! values and hands each one to every registered [`Hook`] that asked for the
//! entry's level.

mod hooks;
mod logger;

pub use hooks::{Hook, LevelHooks};
pub use logger::{EntryBuilder, Logger};
