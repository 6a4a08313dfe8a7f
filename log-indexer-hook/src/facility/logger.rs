//! Logger: builds entries and dispatches them to hooks.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use log_indexer_shared::{Entry, Fields, Level};
use serde_json::Value;
use tracing::warn;

use crate::errors::HookError;
use crate::facility::hooks::{Hook, LevelHooks};

/// A logger with a severity threshold and a set of hooks.
///
/// Entries less severe than the threshold are dropped before any hook sees
/// them. Hook failures are reported on the process's `tracing` output, never
/// back through this logger.
pub struct Logger {
    level: RwLock<Level>,
    hooks: RwLock<Arc<LevelHooks>>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl Logger {
    /// Create a logger that accepts entries at `level` or more severe.
    pub fn new(level: Level) -> Self {
        Self {
            level: RwLock::new(level),
            hooks: RwLock::new(Arc::new(LevelHooks::new())),
        }
    }

    /// Current threshold.
    pub fn level(&self) -> Level {
        *self.level.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the threshold.
    pub fn set_level(&self, level: Level) {
        *self.level.write().unwrap_or_else(PoisonError::into_inner) = level;
    }

    /// Whether an entry at `level` would be dispatched.
    pub fn is_enabled(&self, level: Level) -> bool {
        level <= self.level()
    }

    /// Register a hook. Entries already being dispatched are unaffected.
    pub fn add_hook(&self, hook: Arc<dyn Hook>) {
        let mut guard = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        let mut hooks = LevelHooks::clone(&guard);
        hooks.add(hook);
        *guard = Arc::new(hooks);
    }

    /// Start an entry carrying one field.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> EntryBuilder<'_> {
        EntryBuilder::new(self).with_field(key, value)
    }

    /// Start an entry carrying `fields`.
    pub fn with_fields(&self, fields: Fields) -> EntryBuilder<'_> {
        EntryBuilder::new(self).with_fields(fields)
    }

    /// Log `message` at `level` with no fields.
    pub async fn log(&self, level: Level, message: impl Into<String>) {
        EntryBuilder::new(self).log(level, message).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message).await;
    }

    pub async fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message).await;
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message).await;
    }

    pub async fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message).await;
    }

    /// Dispatch a fully built entry to the hooks registered for its level.
    ///
    /// The threshold is not consulted; callers that bypass the builder are
    /// expected to have filtered already.
    pub async fn dispatch(&self, entry: &Entry) -> Result<(), HookError> {
        let hooks = Arc::clone(&*self.hooks.read().unwrap_or_else(PoisonError::into_inner));
        hooks.fire(entry.level, entry).await
    }
}

/// Accumulates fields for a single entry.
pub struct EntryBuilder<'a> {
    logger: &'a Logger,
    data: Fields,
    time: Option<DateTime<Utc>>,
}

impl<'a> EntryBuilder<'a> {
    fn new(logger: &'a Logger) -> Self {
        Self {
            logger,
            data: Fields::new(),
            time: None,
        }
    }

    /// Add a field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Add several fields, replacing existing keys.
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.data.extend(fields);
        self
    }

    /// Use `time` instead of the time the entry is logged.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Build the entry and dispatch it if `level` passes the threshold.
    pub async fn log(self, level: Level, message: impl Into<String>) {
        if !self.logger.is_enabled(level) {
            return;
        }

        let entry = Entry {
            time: self.time.unwrap_or_else(Utc::now),
            level,
            message: message.into(),
            data: self.data,
        };

        if let Err(e) = self.logger.dispatch(&entry).await {
            warn!(error = %e, level = %level, "Failed to fire hook");
        }
    }

    pub async fn error(self, message: impl Into<String>) {
        self.log(Level::Error, message).await;
    }

    pub async fn warn(self, message: impl Into<String>) {
        self.log(Level::Warn, message).await;
    }

    pub async fn info(self, message: impl Into<String>) {
        self.log(Level::Info, message).await;
    }

    pub async fn debug(self, message: impl Into<String>) {
        self.log(Level::Debug, message).await;
    }
}
