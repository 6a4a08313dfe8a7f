//! Settings read from the environment.

use std::env;
use std::str::FromStr;

use log_indexer_repository::IndexSettings;
use log_indexer_shared::Level;

use crate::AppError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default host recorded in every envelope.
const DEFAULT_HOST: &str = "localhost";

/// Default index name, or prefix when rotating daily.
const DEFAULT_INDEX: &str = "logs";

/// How the target index is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRotation {
    /// Always the configured index.
    Fixed,
    /// `<index>-YYYY.MM.DD`, one per UTC day.
    Daily,
}

impl FromStr for IndexRotation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "none" => Ok(Self::Fixed),
            "daily" => Ok(Self::Daily),
            other => Err(AppError::config(format!(
                "LOG_INDEX_ROTATION must be `fixed` or `daily`, got `{}`",
                other
            ))),
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub opensearch_url: String,
    pub host: String,
    pub level: Level,
    pub index: String,
    pub rotation: IndexRotation,
    /// Maximum number of provisioned indices the hook remembers.
    pub keep_indices: Option<usize>,
    pub index_settings: IndexSettings,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `LOG_HOST`: Host recorded in every document (default: localhost)
    /// - `LOG_LEVEL`: Least severe level shipped (default: debug)
    /// - `LOG_INDEX`: Index name, or prefix with daily rotation (default: logs)
    /// - `LOG_INDEX_ROTATION`: `fixed` or `daily` (default: fixed)
    /// - `LOG_INDEX_KEEP`: Number of provisioned indices to remember, at least 1 (default: unlimited)
    /// - `OPENSEARCH_SHARDS` / `OPENSEARCH_REPLICAS`: Settings for new indices (default: 1 / 1)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opensearch_url =
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let host = lookup("LOG_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let index = lookup("LOG_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string());

        let level = match lookup("LOG_LEVEL") {
            Some(value) => value
                .parse::<Level>()
                .map_err(|e| AppError::config(e.to_string()))?,
            None => Level::Debug,
        };

        let rotation = match lookup("LOG_INDEX_ROTATION") {
            Some(value) => value.parse()?,
            None => IndexRotation::Fixed,
        };

        let keep_indices = lookup("LOG_INDEX_KEEP")
            .map(|value| parse_number("LOG_INDEX_KEEP", &value))
            .transpose()?;

        let defaults = IndexSettings::default();
        let number_of_shards = lookup("OPENSEARCH_SHARDS")
            .map(|value| parse_number("OPENSEARCH_SHARDS", &value))
            .transpose()?
            .unwrap_or(defaults.number_of_shards);
        let number_of_replicas = lookup("OPENSEARCH_REPLICAS")
            .map(|value| parse_number("OPENSEARCH_REPLICAS", &value))
            .transpose()?
            .unwrap_or(defaults.number_of_replicas);

        if index.trim().is_empty() {
            return Err(AppError::config("LOG_INDEX must not be empty"));
        }
        if keep_indices == Some(0) {
            return Err(AppError::config("LOG_INDEX_KEEP must be at least 1"));
        }

        Ok(Self {
            opensearch_url,
            host,
            level,
            index,
            rotation,
            keep_indices,
            index_settings: IndexSettings::new(number_of_shards, number_of_replicas),
        })
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{} must be a non-negative integer, got `{}`", key, value)))
}
