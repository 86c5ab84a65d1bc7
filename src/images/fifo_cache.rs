use lru::LruCache;
use std::num::NonZeroUsize;

/// A bounded map that evicts in insertion order.
///
/// Backed by an [`LruCache`] that is never promoted: reads go through `peek` and
/// re-inserting an existing key replaces its value in place, so eviction follows first
/// insertion rather than recency.
#[derive(Debug)]
pub struct FifoCache<V> {
    entries: LruCache<String, V>,
}

impl<V> FifoCache<V> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.peek(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Inserts `value`, returning the entry evicted to make room, if any.
    pub fn insert(&mut self, key: String, value: V) -> Option<(String, V)> {
        if let Some(existing) = self.entries.peek_mut(key.as_str()) {
            *existing = value;
            return None;
        }
        self.entries.push(key, value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(i: usize) -> String {
        format!("https://farm1.staticflickr.com/1/{i}_abc_s.jpg")
    }

    #[test]
    fn test_overflow_evicts_first_inserted() {
        let mut cache = FifoCache::new(80);
        let mut evictions = Vec::new();
        for i in 0..81 {
            if let Some((key, _)) = cache.insert(url(i), i) {
                evictions.push(key);
            }
        }

        // --- Assertions ---
        assert_eq!(cache.len(), 80);
        assert_eq!(evictions, vec![url(0)]);
        assert!(!cache.contains(&url(0)), "First inserted URL must be evicted");
        for i in 1..81 {
            assert_eq!(cache.get(&url(i)), Some(&i), "URL {i} should be cached");
        }
    }

    #[test]
    fn test_reads_do_not_refresh_position() {
        let mut cache = FifoCache::new(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        // An LRU would now evict "b"; FIFO still evicts "a".
        assert_eq!(cache.get("a"), Some(&1));
        let evicted = cache.insert("c".to_string(), 3);

        assert_eq!(evicted, Some(("a".to_string(), 1)));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_reinsert_replaces_value_in_place() {
        let mut cache = FifoCache::new(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.insert("a".to_string(), 10), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(&10));

        let evicted = cache.insert("c".to_string(), 3);
        assert_eq!(evicted.map(|(k, _)| k), Some("a".to_string()));
    }

    #[test]
    fn test_zero_capacity_holds_one_entry() {
        let mut cache = FifoCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_clear() {
        let mut cache = FifoCache::new(3);
        cache.insert("a".to_string(), 1);
        cache.clear();
        assert!(cache.is_empty());
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);
        cache.insert("d".to_string(), 4);
        assert_eq!(cache.insert("e".to_string(), 5).map(|(k, _)| k), Some("b".to_string()));
    }
}
