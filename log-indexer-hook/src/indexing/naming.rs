//! Index name resolution.

use chrono::{DateTime, Utc};

/// Produces the name of the index the next entry should go to.
///
/// Called on every entry, so implementations can rotate indices over time.
pub trait IndexNamer: Send + Sync {
    fn index_name(&self) -> String;
}

impl<F> IndexNamer for F
where
    F: Fn() -> String + Send + Sync,
{
    fn index_name(&self) -> String {
        self()
    }
}

/// Always the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIndex(pub String);

impl FixedIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl IndexNamer for FixedIndex {
    fn index_name(&self) -> String {
        self.0.clone()
    }
}

/// One index per UTC day: `<prefix>-YYYY.MM.DD`.
///
/// Names sort chronologically, which [`KeepRecent`](super::KeepRecent) relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyIndex {
    pub prefix: String,
}

impl DailyIndex {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Index name for `time`.
    pub fn name_at(&self, time: DateTime<Utc>) -> String {
        format!("{}-{}", self.prefix, time.format("%Y.%m.%d"))
    }
}

impl IndexNamer for DailyIndex {
    fn index_name(&self) -> String {
        self.name_at(Utc::now())
    }
}
