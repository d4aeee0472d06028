//! Approximate LRU path cache (`spec.md` §4.5).
//!
//! Grounded on `original_source/include/lru_cache.hpp`: rather than an exact
//! LRU (intrusive linked list + hash map), entries carry a timestamp from a
//! process-wide monotonic counter, and eviction samples a handful of entries
//! and throws out the oldest of the sample. This buys O(1) `touch` with no
//! list-splicing at the cost of only approximate recency — acceptable for a
//! cache whose purpose is cutting repeated path re-walks, not exact LRU
//! fairness. Unlike the C++ original, which left the cache wired up but
//! never actually called from `get`/`set` (see `spec.md` SPEC_FULL §F), this
//! one is live.

use crate::element::ElementId;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

/// How many entries to examine when a slot must be evicted, and how many of
/// those (the oldest) to actually drop. Matches the C++ default sample/evict
/// sizes.
const SAMPLE_SIZE: usize = 8;
const EVICT_COUNT: usize = 3;

static CLOCK: AtomicU64 = AtomicU64::new(0);

fn tick() -> u64 {
    CLOCK.fetch_add(1, Ordering::Relaxed)
}

struct Entry {
    element: ElementId,
    touched_at: u64,
}

/// Maps a full path string to the [`ElementId`] it last resolved to.
///
/// A cache hit is only ever a hint: callers must still confirm the cached
/// element is still reachable (it always is here, since `set` never removes
/// an [`ElementId`] from the store — see `crate::element::ElementStore`),
/// but a stale hit after the path's structure has changed underneath it is
/// the caller's problem to detect, not this cache's.
pub struct PathCache {
    capacity: usize,
    entries: HashMap<String, Entry>,
}

impl PathCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { capacity: capacity.get(), entries: HashMap::new() }
    }

    pub fn get(&mut self, path: &str) -> Option<ElementId> {
        let touched_at = tick();
        let entry = self.entries.get_mut(path)?;
        entry.touched_at = touched_at;
        Some(entry.element)
    }

    pub fn set(&mut self, path: &str, element: ElementId) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(path) {
            self.evict_some();
        }
        self.entries.insert(path.to_string(), Entry { element, touched_at: tick() });
    }

    pub fn invalidate(&mut self, path: &str) {
        self.entries.remove(path);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sample up to `SAMPLE_SIZE` entries and drop the `EVICT_COUNT` oldest
    /// among them. Iteration order over a `HashMap` is effectively random
    /// from call to call, which is exactly the sampling this needs.
    fn evict_some(&mut self) {
        let mut sample: Vec<(String, u64)> = self
            .entries
            .iter()
            .take(SAMPLE_SIZE)
            .map(|(k, v)| (k.clone(), v.touched_at))
            .collect();
        sample.sort_by_key(|(_, t)| *t);
        for (key, _) in sample.into_iter().take(EVICT_COUNT) {
            self.entries.remove(&key);
        }
    }
}
