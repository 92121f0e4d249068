use crate::{comparable_key, ComparableKey, RawJob};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<ComparableKey>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the job and returns true the first time its comparable key is
    /// seen; returns false and leaves the set untouched on a repeat.
    pub fn is_unique(&mut self, raw: &RawJob) -> bool {
        self.insert(comparable_key(raw))
    }

    /// Same as [`Deduplicator::is_unique`] for a key built ahead of time.
    pub fn insert(&mut self, key: ComparableKey) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
