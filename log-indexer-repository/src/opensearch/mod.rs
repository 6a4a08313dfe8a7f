//! OpenSearch implementation of the index backend.
//!
//! This module provides a concrete implementation of `IndexBackend`
//! using OpenSearch as the backend.

mod client;
mod index_config;

pub use client::OpenSearchBackend;
pub use index_config::IndexSettings;
