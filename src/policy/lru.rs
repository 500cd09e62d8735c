//! # Least Recently Used (LRU) cache.
//!
//! Fixed-capacity key-value cache that evicts the least recently touched
//! entry when a new key would exceed capacity. Every operation is O(1)
//! amortized; the recency order is never scanned on the hot path.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                     LruCache<K, V>                       │
//!   │                                                          │
//!   │   ┌──────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, SlotId> (index)                    │   │
//!   │   │                                                  │   │
//!   │   │   key_1 ──┐   key_2 ──┐   key_3 ──┐              │   │
//!   │   └───────────┼───────────┼───────────┼──────────────┘   │
//!   │               ▼           ▼           ▼                  │
//!   │   ┌──────────────────────────────────────────────────┐   │
//!   │   │  IntrusiveList<Entry<K, V>> (recency order)      │   │
//!   │   │                                                  │   │
//!   │   │  head ─► [slot] ◄──► [slot] ◄──► [slot] ◄─ tail  │   │
//!   │   │          (MRU)                   (LRU)           │   │
//!   │   └──────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The index and the recency order always hold exactly the same key set:
//! the index maps each key to the `SlotId` of its list node, and each list
//! node carries the key so eviction can unmap the tail without a reverse
//! lookup. `check_invariants` verifies the bijection.
//!
//! ## Operation flow
//!
//! ```text
//!   get(k) hit:      index lookup ─► move node to head ─► return &value
//!   insert(k, v):
//!     existing key:  replace value ─► move node to head
//!     new, not full: push node at head ─► map key to its slot
//!     new, at cap:   pop tail node ─► unmap its key ─► push at head ─► map
//! ```
//!
//! | Method            | Complexity | Recency effect       |
//! |-------------------|------------|----------------------|
//! | `insert(k, v)`    | O(1)*      | entry becomes MRU    |
//! | `get(&k)`         | O(1)       | entry becomes MRU    |
//! | `peek(&k)`        | O(1)       | none                 |
//! | `touch(&k)`       | O(1)       | entry becomes MRU    |
//! | `remove(&k)`      | O(1)       | entry gone           |
//! | `pop_lru()`       | O(1)       | tail entry gone      |
//! | `peek_lru()`      | O(1)       | none                 |
//! | `recency_rank()`  | O(n)       | none                 |
//!
//! Note that `get` is a mutation: a hit re-heads the entry, which changes
//! which key the next eviction removes. Callers that must not perturb the
//! eviction order use [`LruCache::peek`].
//!
//! ## Safety
//!
//! The recency order is a [`SlotArena`](crate::ds::SlotArena)-backed
//! [`IntrusiveList`](crate::ds::IntrusiveList): nodes link by stable
//! `SlotId` handles rather than raw pointers, so the whole cache is safe
//! Rust with no `unsafe` in the policy core.
//!
//! ## Thread safety
//!
//! - [`LruCache`]: **not** thread-safe; all operations take `&mut self`.
//! - [`ConcurrentLruCache`] (feature `concurrency`): serializes every
//!   operation behind one `parking_lot::RwLock` so the index and the
//!   recency order are always mutated together, never observably apart.

use std::fmt;
use std::hash::Hash;
use std::mem;

use rustc_hash::FxHashMap;

#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::RwLock;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

/// A resident cache entry: the key is duplicated here so eviction can
/// unmap the tail without a reverse index.
#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Fixed-capacity LRU cache over a hashed index and an arena-backed
/// recency list.
///
/// Capacity is fixed at construction and must be positive; see
/// [`LruCache::try_new`]. Missing keys are reported as `None`, never as a
/// sentinel value.
///
/// # Example
///
/// ```
/// use lrukit::policy::lru::LruCache;
/// use lrukit::traits::CoreCache;
///
/// let mut cache: LruCache<u32, String> = LruCache::new(2);
/// cache.insert(1, "one".to_string());
/// cache.insert(2, "two".to_string());
///
/// // A hit re-heads the entry, protecting it from the next eviction.
/// assert_eq!(cache.get(&1), Some(&"one".to_string()));
///
/// cache.insert(3, "three".to_string()); // evicts key 2
/// assert!(!cache.contains(&2));
/// assert!(cache.contains(&1));
/// ```
pub struct LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, SlotId>,
    order: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache bounded to `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero; a cache that can hold
    /// no entries is an invalid configuration, not a degenerate cache.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let cache = LruCache::<u64, String>::try_new(100).unwrap();
    /// assert!(LruCache::<u64, String>::try_new(0).is_err());
    /// # let _ = cache;
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be greater than zero"));
        }
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: IntrusiveList::with_capacity(capacity),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Creates a cache bounded to `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`LruCache::try_new`] to handle
    /// the invalid configuration as a value.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Read-only lookup without a recency update.
    ///
    /// Unlike [`get`](CoreCache::get), the entry keeps its position in the
    /// eviction order.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    /// use lrukit::traits::CoreCache;
    ///
    /// let mut cache = LruCache::new(2);
    /// cache.insert(1, "first");
    /// cache.insert(2, "second");
    ///
    /// assert_eq!(cache.peek(&1), Some(&"first"));
    ///
    /// // Key 1 is still LRU and goes first.
    /// cache.insert(3, "third");
    /// assert!(!cache.contains(&1));
    /// ```
    pub fn peek(&self, key: &K) -> Option<&V> {
        let found = self.index.get(key).copied();
        #[cfg(feature = "metrics")]
        self.metrics.record_peek(found.is_some());
        let id = found?;
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Iterates entries from most to least recently used, without
    /// touching recency.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Verifies the structural invariants between index and recency order.
    ///
    /// Checks that both structures hold the same number of entries, that
    /// the entry count never exceeds capacity, and that the key set of the
    /// index and the recency order form a bijection.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] naming the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but order holds {} entries",
                self.index.len(),
                self.order.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} resident entries exceed capacity {}",
                self.index.len(),
                self.capacity
            )));
        }

        let mut walked = 0usize;
        for id in self.order.iter_ids() {
            let entry = self
                .order
                .get(id)
                .ok_or_else(|| InvariantError::new("order links to a dead slot"))?;
            match self.index.get(&entry.key) {
                Some(&mapped) if mapped == id => {},
                Some(_) => {
                    return Err(InvariantError::new(
                        "index maps a key to a different slot than the order node holding it",
                    ));
                },
                None => {
                    return Err(InvariantError::new(
                        "order holds a key that is missing from the index",
                    ));
                },
            }
            walked += 1;
            if walked > self.order.len() {
                return Err(InvariantError::new("cycle detected in recency order"));
            }
        }

        if walked != self.index.len() {
            return Err(InvariantError::new(
                "recency order is shorter than the index",
            ));
        }

        Ok(())
    }
}

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts or updates `key`, making it the most recently used entry.
    ///
    /// A new key at capacity first evicts the tail of the recency order:
    /// the evicted key is removed from both structures before the new
    /// entry exists, so the capacity bound holds at every observable
    /// point. Never fails; returns the previous value on update.
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            let entry = self
                .order
                .get_mut(id)
                .expect("indexed key must have a live order node");
            let previous = mem::replace(&mut entry.value, value);
            self.order.move_to_front(id);
            return Some(previous);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if self.index.len() == self.capacity {
            if let Some(evicted) = self.order.pop_back() {
                self.index.remove(&evicted.key);
                #[cfg(feature = "metrics")]
                self.metrics.record_eviction();
            }
        }

        let id = self.order.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    /// Looks up `key`, moving the entry to the MRU position on a hit.
    ///
    /// A miss returns `None` and changes nothing.
    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            },
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.order.move_to_front(id);
        self.order.get(id).map(|entry| &entry.value)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.order.remove(id).map(|entry| entry.value)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.order.pop_back();
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_lru(entry.is_some());
        let entry = entry?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    #[inline]
    fn peek_lru(&self) -> Option<(&K, &V)> {
        let back = self.order.back();
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_lru(back.is_some());
        back.map(|entry| (&entry.key, &entry.value))
    }

    #[inline]
    fn touch(&mut self, key: &K) -> bool {
        let found = match self.index.get(key) {
            Some(&id) => self.order.move_to_front(id),
            None => false,
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_touch(found);
        found
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        let target = self.index.get(key).copied();
        #[cfg(feature = "metrics")]
        self.metrics.record_recency_rank(target.is_some());
        let target = target?;
        self.order.iter_ids().position(|id| id == target)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Copies the current counters plus size gauges into a snapshot.
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            pop_lru_calls: self.metrics.pop_lru_calls,
            pop_lru_found: self.metrics.pop_lru_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            peek_lru_calls: self.metrics.peek_lru_calls.get(),
            peek_lru_found: self.metrics.peek_lru_found.get(),
            recency_rank_calls: self.metrics.recency_rank_calls.get(),
            recency_rank_found: self.metrics.recency_rank_found.get(),
            cache_len: self.index.len(),
            capacity: self.capacity,
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Thread-safe LRU cache wrapper.
///
/// All operations go through a single `parking_lot::RwLock` guarding the
/// index and the recency order as one unit, so the pair is always mutated
/// atomically. Values are stored as `Arc<V>` so owned handles can be
/// returned from behind the lock without cloning the payload.
///
/// Note that `get` takes the **write** lock: a recency-ordered hit is a
/// mutation. Use [`peek`](ConcurrentLruCache::peek) for lock-friendly
/// read-only lookups.
#[cfg(feature = "concurrency")]
#[derive(Clone)]
pub struct ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Arc<RwLock<LruCache<K, Arc<V>>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Creates a thread-safe cache bounded to `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(RwLock::new(LruCache::try_new(capacity)?)),
        })
    }

    /// Creates a thread-safe cache bounded to `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::ConcurrentLruCache;
    ///
    /// let cache: ConcurrentLruCache<u32, String> = ConcurrentLruCache::new(100);
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Inserts a value, wrapping it in `Arc<V>` internally.
    ///
    /// Returns the previous `Arc<V>` if the key existed.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::ConcurrentLruCache;
    ///
    /// let cache: ConcurrentLruCache<u32, String> = ConcurrentLruCache::new(100);
    ///
    /// let old = cache.insert(1, "first".to_string());
    /// assert!(old.is_none());
    ///
    /// let old = cache.insert(1, "updated".to_string());
    /// assert_eq!(*old.unwrap(), "first");
    /// ```
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        let value = Arc::new(value);
        let mut cache = self.inner.write();
        cache.insert(key, value)
    }

    /// Inserts a pre-wrapped `Arc<V>` directly.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::ConcurrentLruCache;
    /// use std::sync::Arc;
    ///
    /// let cache: ConcurrentLruCache<u32, String> = ConcurrentLruCache::new(100);
    /// let shared = Arc::new("shared".to_string());
    /// cache.insert_arc(1, Arc::clone(&shared));
    ///
    /// let retrieved = cache.get(&1).unwrap();
    /// assert!(Arc::ptr_eq(&shared, &retrieved));
    /// ```
    pub fn insert_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        let mut cache = self.inner.write();
        cache.insert(key, value)
    }

    /// Gets a value by key, moving it to the MRU position.
    ///
    /// Takes the write lock because a hit updates the recency order.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut cache = self.inner.write();
        cache.get(key).map(Arc::clone)
    }

    /// Looks up a value without affecting the recency order.
    ///
    /// Only takes the read lock, so concurrent peeks do not serialize.
    ///
    /// # Example
    ///
    /// ```
    /// use lrukit::policy::lru::ConcurrentLruCache;
    ///
    /// let cache: ConcurrentLruCache<u32, String> = ConcurrentLruCache::new(2);
    /// cache.insert(1, "first".to_string());
    /// cache.insert(2, "second".to_string());
    ///
    /// assert_eq!(*cache.peek(&1).unwrap(), "first");
    ///
    /// // Key 1 stayed LRU, so it is the next to go.
    /// cache.insert(3, "third".to_string());
    /// assert!(!cache.contains(&1));
    /// ```
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        let cache = self.inner.read();
        cache.peek(key).map(Arc::clone)
    }

    /// Removes an entry and returns its `Arc<V>`.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        let mut cache = self.inner.write();
        cache.remove(key)
    }

    /// Marks an entry as recently used without retrieving its value.
    ///
    /// Returns `true` if the key was found.
    pub fn touch(&self, key: &K) -> bool {
        let mut cache = self.inner.write();
        cache.touch(key)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&self) -> Option<(K, Arc<V>)> {
        let mut cache = self.inner.write();
        cache.pop_lru()
    }

    /// Peeks at the least recently used entry without removing it.
    pub fn peek_lru(&self) -> Option<(K, Arc<V>)> {
        let cache = self.inner.read();
        cache.peek_lru().map(|(k, v)| (k.clone(), Arc::clone(v)))
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        let cache = self.inner.read();
        cache.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        let cache = self.inner.read();
        cache.is_empty()
    }

    /// Returns the maximum capacity.
    pub fn capacity(&self) -> usize {
        let cache = self.inner.read();
        cache.capacity()
    }

    /// Returns `true` if the key exists, without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        let cache = self.inner.read();
        cache.contains(key)
    }

    /// Clears all entries.
    pub fn clear(&self) {
        let mut cache = self.inner.write();
        cache.clear()
    }
}

#[cfg(all(feature = "concurrency", feature = "metrics"))]
impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Copies the current counters plus size gauges into a snapshot.
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        let cache = self.inner.read();
        cache.metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.read();
        f.debug_struct("ConcurrentLruCache")
            .field("len", &cache.index.len())
            .field("capacity", &cache.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod construction {
        use super::*;

        #[test]
        fn try_new_rejects_zero_capacity() {
            let result = LruCache::<u32, u32>::try_new(0);
            let err = result.unwrap_err();
            assert!(err.to_string().contains("capacity"));
        }

        #[test]
        fn try_new_accepts_positive_capacity() {
            let cache = LruCache::<u32, u32>::try_new(1).unwrap();
            assert_eq!(cache.capacity(), 1);
            assert_eq!(cache.len(), 0);
        }

        #[test]
        #[should_panic(expected = "capacity must be greater than zero")]
        fn new_panics_on_zero_capacity() {
            let _ = LruCache::<u32, u32>::new(0);
        }

        #[test]
        fn fresh_cache_is_empty() {
            let cache = LruCache::<u32, u32>::new(10);
            assert_eq!(cache.len(), 0);
            assert!(cache.is_empty());
            assert_eq!(cache.capacity(), 10);
        }
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn insert_then_get_returns_value() {
            let mut cache = LruCache::new(5);
            assert_eq!(cache.insert(1, 100), None);
            assert_eq!(cache.get(&1), Some(&100));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn get_missing_key_is_none() {
            let mut cache = LruCache::new(5);
            cache.insert(1, 100);
            assert_eq!(cache.get(&2), None);
        }

        #[test]
        fn insert_existing_key_updates_value() {
            let mut cache = LruCache::new(5);
            assert_eq!(cache.insert(1, 100), None);
            assert_eq!(cache.insert(1, 200), Some(100));
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.get(&1), Some(&200));
        }

        #[test]
        fn remove_existing_key() {
            let mut cache = LruCache::new(5);
            cache.insert(1, 100);
            assert_eq!(cache.remove(&1), Some(100));
            assert_eq!(cache.len(), 0);
            assert!(!cache.contains(&1));
            assert_eq!(cache.remove(&1), None);
        }

        #[test]
        fn clear_removes_everything() {
            let mut cache = LruCache::new(5);
            for i in 1..=3 {
                cache.insert(i, i * 10);
            }
            cache.clear();
            assert!(cache.is_empty());
            for i in 1..=3 {
                assert!(!cache.contains(&i));
            }
            cache.check_invariants().unwrap();
        }

        #[test]
        fn operations_on_empty_cache() {
            let mut cache: LruCache<u32, u32> = LruCache::new(5);
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.peek(&1), None);
            assert!(!cache.contains(&1));
            assert_eq!(cache.remove(&1), None);
            assert_eq!(cache.pop_lru(), None);
            assert_eq!(cache.peek_lru(), None);
            assert!(!cache.touch(&1));
            assert_eq!(cache.recency_rank(&1), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn string_keys_work() {
            let mut cache = LruCache::new(2);
            cache.insert("alpha".to_string(), 1);
            cache.insert("beta".to_string(), 2);
            assert_eq!(cache.get(&"alpha".to_string()), Some(&1));

            cache.insert("gamma".to_string(), 3);
            assert!(!cache.contains(&"beta".to_string()));
        }

        #[test]
        fn extend_inserts_in_order() {
            let mut cache = LruCache::new(2);
            cache.extend(vec![(1, 10), (2, 20), (3, 30)]);
            assert_eq!(cache.len(), 2);
            assert!(!cache.contains(&1));
            assert_eq!(cache.peek(&3), Some(&30));
        }
    }

    mod recency_order {
        use super::*;

        #[test]
        fn get_moves_entry_to_mru() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.insert(3, 300);

            cache.get(&1);

            // Key 2 is now LRU, so it goes first.
            cache.insert(4, 400);
            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));
        }

        #[test]
        fn peek_does_not_move_entry() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.insert(3, 300);

            cache.peek(&1);

            cache.insert(4, 400);
            assert!(!cache.contains(&1));
        }

        #[test]
        fn update_moves_entry_to_mru() {
            let mut cache = LruCache::new(2);
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.insert(1, 10);

            // Updating key 1 made it MRU, so key 2 is evicted.
            cache.insert(3, 3);
            assert_eq!(cache.get(&1), Some(&10));
            assert_eq!(cache.get(&2), None);
            assert_eq!(cache.get(&3), Some(&3));
        }

        #[test]
        fn touch_refreshes_without_value() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.insert(3, 300);

            assert!(cache.touch(&1));
            cache.insert(4, 400);
            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));

            assert!(!cache.touch(&99));
        }

        #[test]
        fn repeated_gets_are_idempotent() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.insert(3, 300);

            assert_eq!(cache.get(&2), Some(&200));
            assert_eq!(cache.get(&2), Some(&200));

            // Key 1 stayed LRU relative to key 3 throughout.
            assert_eq!(cache.peek_lru().map(|(k, _)| *k), Some(1));
        }

        #[test]
        fn recency_rank_counts_from_mru() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.insert(3, 300);

            assert_eq!(cache.recency_rank(&3), Some(0));
            assert_eq!(cache.recency_rank(&2), Some(1));
            assert_eq!(cache.recency_rank(&1), Some(2));
            assert_eq!(cache.recency_rank(&99), None);

            cache.get(&1);
            assert_eq!(cache.recency_rank(&1), Some(0));
            assert_eq!(cache.recency_rank(&3), Some(1));
        }

        #[test]
        fn iter_walks_mru_to_lru() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.insert(3, 300);
            cache.get(&2);

            let keys: Vec<u32> = cache.iter().map(|(k, _)| *k).collect();
            assert_eq!(keys, vec![2, 3, 1]);
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn insert_at_capacity_evicts_lru() {
            let mut cache = LruCache::new(2);
            cache.insert(1, 100);
            cache.insert(2, 200);
            assert_eq!(cache.len(), 2);

            cache.insert(3, 300);
            assert_eq!(cache.len(), 2);
            assert!(!cache.contains(&1));
            assert!(cache.contains(&2));
            assert!(cache.contains(&3));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn capacity_one_churns_correctly() {
            let mut cache = LruCache::new(1);
            cache.insert(1, 100);
            cache.insert(2, 200);
            assert_eq!(cache.len(), 1);
            assert!(!cache.contains(&1));
            assert_eq!(cache.get(&2), Some(&200));
        }

        #[test]
        fn eviction_removes_exactly_the_lru_key() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.insert(3, 3);
            cache.get(&1);
            cache.get(&3);

            // Recency is now 3, 1, 2 from MRU to LRU.
            cache.insert(4, 4);
            assert!(!cache.contains(&2));
            assert_eq!(cache.len(), 3);
            for key in [1, 3, 4] {
                assert!(cache.contains(&key));
            }
        }

        #[test]
        fn pop_lru_drains_in_reverse_touch_order() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.insert(3, 300);
            cache.touch(&1);

            assert_eq!(cache.pop_lru(), Some((2, 200)));
            assert_eq!(cache.pop_lru(), Some((3, 300)));
            assert_eq!(cache.pop_lru(), Some((1, 100)));
            assert_eq!(cache.pop_lru(), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn peek_lru_does_not_remove() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 100);
            cache.insert(2, 200);

            assert_eq!(cache.peek_lru(), Some((&1, &100)));
            assert_eq!(cache.peek_lru(), Some((&1, &100)));
            assert_eq!(cache.len(), 2);
        }

        #[test]
        fn capacity_bound_holds_under_churn() {
            let mut cache = LruCache::new(4);
            for i in 0..100u32 {
                cache.insert(i, i);
                assert!(cache.len() <= 4);
                cache.check_invariants().unwrap();
            }
            // The last four inserts are resident.
            for i in 96..100 {
                assert!(cache.contains(&i));
            }
        }

        #[test]
        fn removed_key_is_not_counted_for_eviction() {
            let mut cache = LruCache::new(2);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.remove(&1);

            // Room for one more without evicting key 2.
            cache.insert(3, 300);
            assert!(cache.contains(&2));
            assert!(cache.contains(&3));
            cache.check_invariants().unwrap();
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn counters_track_operations() {
            let mut cache = LruCache::new(2);
            cache.insert(1, 100);
            cache.insert(2, 200);
            cache.insert(1, 150);
            cache.insert(3, 300); // evicts key 2
            cache.get(&1);
            cache.get(&2);
            cache.peek(&3);
            cache.peek(&99);

            let snap = cache.metrics_snapshot();
            assert_eq!(snap.insert_calls, 4);
            assert_eq!(snap.insert_new, 3);
            assert_eq!(snap.insert_updates, 1);
            assert_eq!(snap.evicted_entries, 1);
            assert_eq!(snap.get_calls, 2);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.peek_calls, 2);
            assert_eq!(snap.peek_found, 1);
            assert_eq!(snap.cache_len, 2);
            assert_eq!(snap.capacity, 2);
            assert_eq!(snap.hit_ratio(), Some(0.5));
        }
    }

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;

        #[test]
        fn basic_ops_through_lock() {
            let cache: ConcurrentLruCache<u32, String> = ConcurrentLruCache::new(2);
            assert!(cache.insert(1, "one".to_string()).is_none());
            assert_eq!(*cache.get(&1).unwrap(), "one");

            cache.insert(2, "two".to_string());
            cache.insert(3, "three".to_string()); // key 1 is LRU after 2 landed
            assert_eq!(cache.len(), 2);
            assert!(!cache.contains(&1));
            assert!(cache.contains(&2));
            assert!(cache.contains(&3));
        }

        #[test]
        fn get_protects_from_eviction() {
            let cache: ConcurrentLruCache<u32, u32> = ConcurrentLruCache::new(2);
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.get(&1);

            cache.insert(3, 3);
            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));
        }

        #[test]
        fn try_new_propagates_config_error() {
            assert!(ConcurrentLruCache::<u32, u32>::try_new(0).is_err());
            assert!(ConcurrentLruCache::<u32, u32>::try_new(4).is_ok());
        }

        #[test]
        fn arc_identity_survives_roundtrip() {
            let cache: ConcurrentLruCache<u32, Vec<u8>> = ConcurrentLruCache::new(4);
            let payload = Arc::new(vec![1, 2, 3]);
            cache.insert_arc(7, Arc::clone(&payload));
            let out = cache.get(&7).unwrap();
            assert!(Arc::ptr_eq(&payload, &out));
        }

        #[test]
        fn shared_across_threads() {
            let cache: ConcurrentLruCache<u64, u64> = ConcurrentLruCache::new(64);
            let mut handles = Vec::new();
            for t in 0..4u64 {
                let cache = cache.clone();
                handles.push(std::thread::spawn(move || {
                    for i in 0..64u64 {
                        cache.insert(t * 1000 + i, i);
                        let _ = cache.get(&(t * 1000 + i));
                    }
                }));
            }
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(cache.len(), 64);
        }

        #[test]
        fn pop_and_peek_lru() {
            let cache: ConcurrentLruCache<u32, u32> = ConcurrentLruCache::new(4);
            cache.insert(1, 10);
            cache.insert(2, 20);

            let (key, value) = cache.peek_lru().unwrap();
            assert_eq!((key, *value), (1, 10));
            assert_eq!(cache.len(), 2);

            let (key, value) = cache.pop_lru().unwrap();
            assert_eq!((key, *value), (1, 10));
            assert_eq!(cache.len(), 1);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8, u16),
            Get(u8),
            Remove(u8),
            Touch(u8),
            PopLru,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (any::<u8>(), any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
                any::<u8>().prop_map(Op::Get),
                any::<u8>().prop_map(Op::Remove),
                any::<u8>().prop_map(Op::Touch),
                Just(Op::PopLru),
            ]
        }

        proptest! {
            // Compares the cache against a naive MRU-first Vec model under
            // arbitrary operation sequences; the full recency order must
            // match after every step.
            #[test]
            fn matches_naive_model(
                capacity in 1usize..8,
                ops in proptest::collection::vec(op_strategy(), 1..200),
            ) {
                let mut cache: LruCache<u8, u16> = LruCache::new(capacity);
                let mut model: Vec<(u8, u16)> = Vec::new();

                for op in &ops {
                    match *op {
                        Op::Insert(k, v) => {
                            let previous =
                                model.iter().position(|&(mk, _)| mk == k).map(|pos| {
                                    let old = model.remove(pos).1;
                                    model.insert(0, (k, v));
                                    old
                                });
                            if previous.is_none() {
                                if model.len() == capacity {
                                    model.pop();
                                }
                                model.insert(0, (k, v));
                            }
                            prop_assert_eq!(cache.insert(k, v), previous);
                        },
                        Op::Get(k) => {
                            let expected =
                                model.iter().position(|&(mk, _)| mk == k).map(|pos| {
                                    let entry = model.remove(pos);
                                    model.insert(0, entry);
                                    entry.1
                                });
                            prop_assert_eq!(cache.get(&k).copied(), expected);
                        },
                        Op::Remove(k) => {
                            let expected = model
                                .iter()
                                .position(|&(mk, _)| mk == k)
                                .map(|pos| model.remove(pos).1);
                            prop_assert_eq!(cache.remove(&k), expected);
                        },
                        Op::Touch(k) => {
                            let found = model.iter().position(|&(mk, _)| mk == k);
                            if let Some(pos) = found {
                                let entry = model.remove(pos);
                                model.insert(0, entry);
                            }
                            prop_assert_eq!(cache.touch(&k), found.is_some());
                        },
                        Op::PopLru => {
                            prop_assert_eq!(cache.pop_lru(), model.pop());
                        },
                    }

                    cache.check_invariants().unwrap();
                    prop_assert!(cache.len() <= capacity);

                    let order: Vec<u8> = cache.iter().map(|(k, _)| *k).collect();
                    let model_order: Vec<u8> = model.iter().map(|&(k, _)| k).collect();
                    prop_assert_eq!(order, model_order);
                }
            }
        }
    }
}
