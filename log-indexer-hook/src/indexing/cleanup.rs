//! Cleanup of the provisioned-index set.

use std::collections::HashSet;

/// Names of indices a hook has already provisioned.
pub type IndexSet = HashSet<String>;

/// Called after every newly provisioned index with the hook's full set.
///
/// Removing a name makes the hook check (and if needed create) that index
/// again the next time it resolves to it. The hook holds its set lock while
/// calling this, so implementations never run concurrently with themselves.
pub trait IndexCleanup: Send + Sync {
    fn clean_up(&self, provisioned: &mut IndexSet);
}

impl<F> IndexCleanup for F
where
    F: Fn(&mut IndexSet) + Send + Sync,
{
    fn clean_up(&self, provisioned: &mut IndexSet) {
        self(provisioned)
    }
}

/// Leaves the set untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCleanup;

impl IndexCleanup for NoCleanup {
    fn clean_up(&self, _provisioned: &mut IndexSet) {}
}

/// Remembers only the `max` greatest index names.
///
/// Meant for names that sort by age, such as those from
/// [`DailyIndex`](super::DailyIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepRecent {
    pub max: usize,
}

impl KeepRecent {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl IndexCleanup for KeepRecent {
    fn clean_up(&self, provisioned: &mut IndexSet) {
        if provisioned.len() <= self.max {
            return;
        }

        let mut names: Vec<String> = provisioned.iter().cloned().collect();
        names.sort_unstable();
        let stale = names.len() - self.max;
        for name in &names[..stale] {
            provisioned.remove(name);
        }
    }
}
