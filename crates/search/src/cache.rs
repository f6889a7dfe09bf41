//! Bounded result cache with insertion-order (FIFO) eviction
//!
//! Reads never change eviction order: the oldest inserted entry is always the
//! next one out, however recently it was hit.

use ahash::AHashMap;
use std::collections::VecDeque;

pub struct FifoCache<V> {
    capacity: usize,
    map: AHashMap<String, V>,
    order: VecDeque<String>,
}

impl<V> FifoCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: AHashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Insert or replace an entry, returning the key evicted to make room
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: String, value: V) -> Option<String> {
        if let Some(slot) = self.map.get_mut(&key) {
            *slot = value;
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        self.order.push_back(key.clone());
        self.map.insert(key, value);
        evicted
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let oldest = self.order.pop_front()?;
        self.map.remove(&oldest);
        Some(oldest)
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from oldest to newest
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_insert() {
        let mut cache = FifoCache::new(2);
        assert_eq!(cache.insert("a".into(), 1), None);
        assert_eq!(cache.insert("b".into(), 2), None);

        // A read does not protect "a"
        assert_eq!(cache.get("a"), Some(&1));

        assert_eq!(cache.insert("c".into(), 3), Some("a".to_string()));
        assert!(!cache.contains_key("a"));
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut cache = FifoCache::new(2);
        cache.insert("a".into(), 1);
        cache.insert("b".into(), 2);
        assert_eq!(cache.insert("a".into(), 10), None);

        assert_eq!(cache.get("a"), Some(&10));
        assert_eq!(cache.insert("c".into(), 3), Some("a".to_string()));
    }

    #[test]
    fn test_clear_and_empty_eviction() {
        let mut cache: FifoCache<u8> = FifoCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.evict_oldest(), None);

        cache.insert("x".into(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.keys().count(), 0);
    }
}
