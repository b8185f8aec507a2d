use std::num::NonZeroUsize;

use lru::LruCache;

/// Default capacity of the seen-id cache.
///
/// Dedup only has to cover mesh propagation latency, not process lifetime,
/// so old ids are evicted least-recently-seen first.
pub const SEEN_CAPACITY: usize = 10_000;

/// The set of message ids this node has already processed.
///
/// Gates both forwarding and display to exactly-once per id. Bounded:
/// a long-lived node does not grow without limit.
pub struct SeenSet {
    ids: LruCache<String, ()>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::with_capacity(SEEN_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ids: LruCache::new(capacity),
        }
    }

    /// Record an id. Returns `false` if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.put(id.to_string(), ());
        true
    }

    /// Whether an id has been seen (and not yet evicted).
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new()
    }
}
