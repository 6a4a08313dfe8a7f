//! # Log Indexer Shared
//!
//! Shared types for the log indexer: severity levels, log entries as the
//! logging facility produces them, and the envelope document written to the
//! search backend.

mod entry;
mod envelope;
mod level;

pub use entry::{Entry, Fields};
pub use envelope::{format_rfc3339_nano, LogEnvelope};
pub use level::{Level, ParseLevelError};
