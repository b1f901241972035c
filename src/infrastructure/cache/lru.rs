//! Bounded store with least-recently-used eviction
//!
//! Recency is tracked with a monotonically increasing access tick per key and
//! an ordered index from tick to key, so the least-recently-used key is always
//! the first entry of the index.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::domain::DomainError;

#[derive(Debug)]
struct Slot<V> {
    value: V,
    tick: u64,
}

/// Capacity-limited map with access-order eviction
///
/// `get`, `get_mut` and `put` mark a key as most recently used. `peek`,
/// `contains` and `iter` leave recency untouched. The number of stored
/// entries never exceeds the capacity fixed at construction.
#[derive(Debug)]
pub struct LruStore<K, V> {
    entries: HashMap<K, Slot<V>>,
    order: BTreeMap<u64, K>,
    capacity: usize,
    next_tick: u64,
}

impl<K, V> LruStore<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a store holding at most `capacity` entries
    pub fn new(capacity: usize) -> Result<Self, DomainError> {
        if capacity == 0 {
            return Err(DomainError::configuration(
                "LRU store capacity must be greater than zero",
            ));
        }

        Ok(Self {
            entries: HashMap::with_capacity(capacity.min(4096)),
            order: BTreeMap::new(),
            capacity,
            next_tick: 0,
        })
    }

    fn next_tick(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    /// Get a value and mark it most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key).map(|value| &*value)
    }

    /// Get a mutable value and mark it most recently used
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let tick = self.next_tick();
        let slot = self.entries.get_mut(key)?;

        if let Some(owned) = self.order.remove(&slot.tick) {
            self.order.insert(tick, owned);
        }
        slot.tick = tick;

        Some(&mut slot.value)
    }

    /// Get a value without changing its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Check if a key is stored without changing its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite a value and mark it most recently used
    ///
    /// Returns the evicted entry when a new key pushed the store past capacity.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        let tick = self.next_tick();

        if let Some(slot) = self.entries.get_mut(&key) {
            if let Some(owned) = self.order.remove(&slot.tick) {
                self.order.insert(tick, owned);
            }
            slot.tick = tick;
            slot.value = value;
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        self.order.insert(tick, key.clone());
        self.entries.insert(key, Slot { value, tick });

        evicted
    }

    /// Remove and return the least recently used entry
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.value))
    }

    /// Get the least recently used entry without changing recency
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let (_, key) = self.order.first_key_value()?;
        self.entries.get(key).map(|slot| (key, &slot.value))
    }

    /// Remove a key
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.entries.remove(key)?;
        self.order.remove(&slot.tick);
        Some(slot.value)
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate from least to most recently used without changing recency
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order
            .values()
            .filter_map(move |key| self.entries.get(key).map(|slot| (key, &slot.value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(store: &LruStore<String, u32>) -> Vec<String> {
        store.iter().map(|(k, _)| k.clone()).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = LruStore::<String, u32>::new(0);

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_put_and_get() {
        let mut store = LruStore::new(2).unwrap();

        assert!(store.put("a".to_string(), 1).is_none());

        assert_eq!(store.get("a"), Some(&1));
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut store = LruStore::new(3).unwrap();

        store.put("a".to_string(), 1);
        store.put("b".to_string(), 2);
        store.put("c".to_string(), 3);

        let evicted = store.put("d".to_string(), 4);

        assert_eq!(evicted, Some(("a".to_string(), 1)));
        assert_eq!(store.len(), 3);
        assert!(!store.contains("a"));
        assert_eq!(keys(&store), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut store = LruStore::new(2).unwrap();

        store.put("a".to_string(), 1);
        store.put("b".to_string(), 2);
        store.get("a");

        let evicted = store.put("c".to_string(), 3);

        assert_eq!(evicted, Some(("b".to_string(), 2)));
        assert!(store.contains("a"));
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let mut store = LruStore::new(2).unwrap();

        store.put("a".to_string(), 1);
        store.put("b".to_string(), 2);
        assert_eq!(store.peek("a"), Some(&1));

        let evicted = store.put("c".to_string(), 3);

        assert_eq!(evicted.map(|(k, _)| k), Some("a".to_string()));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut store = LruStore::new(2).unwrap();

        store.put("a".to_string(), 1);
        store.put("b".to_string(), 2);

        assert!(store.put("a".to_string(), 10).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(store.peek("a"), Some(&10));
        assert_eq!(keys(&store), vec!["b", "a"]);
    }

    #[test]
    fn test_get_mut_updates_value() {
        let mut store = LruStore::new(2).unwrap();

        store.put("a".to_string(), 1);
        store.put("b".to_string(), 2);

        if let Some(value) = store.get_mut("a") {
            *value += 40;
        }

        assert_eq!(store.peek("a"), Some(&41));
        assert_eq!(store.peek_lru(), Some((&"b".to_string(), &2)));
    }

    #[test]
    fn test_remove() {
        let mut store = LruStore::new(2).unwrap();

        store.put("a".to_string(), 1);

        assert_eq!(store.remove("a"), Some(1));
        assert_eq!(store.remove("a"), None);
        assert!(store.is_empty());
        assert!(store.peek_lru().is_none());
    }

    #[test]
    fn test_clear() {
        let mut store = LruStore::new(4).unwrap();

        store.put("a".to_string(), 1);
        store.put("b".to_string(), 2);
        store.clear();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);

        store.put("c".to_string(), 3);
        assert_eq!(keys(&store), vec!["c"]);
    }

    #[test]
    fn test_capacity_one() {
        let mut store = LruStore::new(1).unwrap();

        store.put("a".to_string(), 1);
        let evicted = store.put("b".to_string(), 2);

        assert_eq!(evicted, Some(("a".to_string(), 1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let mut store = LruStore::new(5).unwrap();

        for i in 0..100u32 {
            store.put(format!("key-{}", i), i);
            if i % 3 == 0 {
                store.get(&format!("key-{}", i / 2));
            }
            assert!(store.len() <= 5);
        }

        assert_eq!(store.len(), 5);
        assert_eq!(store.iter().count(), 5);
    }
}
