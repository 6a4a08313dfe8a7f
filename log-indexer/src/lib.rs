//! # Log Indexer
//!
//! Main library for the log indexer binary.
//!
//! This crate provides configuration, dependency wiring and the stdin
//! shipper that feeds log lines through the indexing hook.

pub mod config;
pub mod shipper;

pub use config::{Dependencies, IndexRotation, Settings};

use log_indexer_hook::HookError;
use log_indexer_repository::BackendError;
use thiserror::Error;

/// Errors that can occur during start-up or while shipping.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Hook error.
    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    /// Backend error.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
