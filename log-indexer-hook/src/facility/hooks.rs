//! Hook trait and per-level hook registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log_indexer_shared::{Entry, Level};

use crate::errors::HookError;

/// A handler invoked once for every entry whose level it subscribed to.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Levels this hook wants to receive.
    fn levels(&self) -> &[Level];

    /// Handle one entry.
    ///
    /// The returned error is reported by the facility; implementations must
    /// not log it through the facility they are attached to.
    async fn fire(&self, entry: &Entry) -> Result<(), HookError>;
}

/// Hooks registered per level, in registration order.
#[derive(Default, Clone)]
pub struct LevelHooks {
    hooks: HashMap<Level, Vec<Arc<dyn Hook>>>,
}

impl LevelHooks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` under every level it reports.
    pub fn add(&mut self, hook: Arc<dyn Hook>) {
        for level in hook.levels() {
            self.hooks.entry(*level).or_default().push(Arc::clone(&hook));
        }
    }

    /// Hooks registered for `level`.
    pub fn for_level(&self, level: Level) -> &[Arc<dyn Hook>] {
        self.hooks.get(&level).map(Vec::as_slice).unwrap_or_default()
    }

    /// Fire every hook registered for `level`, stopping at the first error.
    pub async fn fire(&self, level: Level, entry: &Entry) -> Result<(), HookError> {
        for hook in self.for_level(level) {
            hook.fire(entry).await?;
        }
        Ok(())
    }
}
