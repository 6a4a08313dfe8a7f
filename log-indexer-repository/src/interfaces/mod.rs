//! Interface definitions for the search backend.
//!
//! This module defines the abstract `IndexBackend` trait that allows
//! for dependency injection and swappable backend implementations.

mod index_backend;

pub use index_backend::IndexBackend;
