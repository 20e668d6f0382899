#![cfg(feature = "lru")]
//! Least-recently-used cache composed from [`List`] and [`UnorderedMap`].
//!
//! The list holds keys in recency order, most recent at the front. The map owns the
//! values and, for every key, the [`ListHandle`] of its node, so a hit promotes in
//! O(1) and eviction is a `pop_back` plus one map removal.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

use fnv::FnvBuildHasher;
use log::trace;

use crate::lists::list::{List, ListHandle};
use crate::maps::UnorderedMap;

/// Common surface of fixed-capacity LRU caches.
pub trait AnyLruCache<K, V> {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn cap(&self) -> NonZeroUsize;
    fn put(&mut self, key: K, value: V) -> Option<V>;
    fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;
    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;
    fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;
    fn clear(&mut self);
    fn pop_lru(&mut self) -> Option<(K, V)>;
}

struct Entry<V> {
    value: V,
    handle: ListHandle,
}

pub struct LruCache<K, V, S = FnvBuildHasher> {
    order: List<K>,
    entries: UnorderedMap<K, Entry<V>, S>,
    capacity: NonZeroUsize,
}

impl<K, V> LruCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_hasher(capacity, FnvBuildHasher::default())
    }
}

impl<K, V, S> LruCache<K, V, S> {
    pub fn with_hasher(capacity: NonZeroUsize, hash_builder: S) -> Self {
        Self {
            order: List::new(),
            entries: UnorderedMap::with_capacity_and_hasher(capacity.get(), hash_builder),
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts or updates `key` and makes it the most recent entry.
    ///
    /// Returns the previous value on update. A fresh key on a full cache evicts the
    /// least recent entry first.
    pub fn put(&mut self, key: K, value: V) -> Option<V>
    where
        K: Clone,
    {
        if let Some(entry) = self.entries.get_mut(&key) {
            self.order
                .move_to_front(entry.handle)
                .expect("cached handle is live");
            return Some(core::mem::replace(&mut entry.value, value));
        }
        if self.len() == self.capacity.get() {
            self.pop_lru();
        }
        let handle = self.order.push_front(key.clone());
        self.entries.insert(key, Entry { value, handle });
        None
    }

    /// Looks `key` up and promotes it on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.get_mut(key)?;
        self.order
            .move_to_front(entry.handle)
            .expect("cached handle is live");
        Some(&entry.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.get_mut(key)?;
        self.order
            .move_to_front(entry.handle)
            .expect("cached handle is live");
        Some(&mut entry.value)
    }

    /// Looks `key` up without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn pop<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.order
            .remove(entry.handle)
            .expect("cached handle is live");
        Some(entry.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let key = self.order.pop_back().ok()?;
        let entry = self
            .entries
            .remove(&key)
            .expect("every listed key has an entry");
        trace!("lru: evicted entry, {} remain", self.order.len());
        Some((key, entry.value))
    }

    /// The entry [`pop_lru`](Self::pop_lru) would remove.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let key = self.order.back().ok()?;
        self.entries.get(key).map(|entry| (key, &entry.value))
    }

    /// Changes the capacity, evicting from the back until the cache fits.
    pub fn resize(&mut self, capacity: NonZeroUsize) {
        while self.len() > capacity.get() {
            self.pop_lru();
        }
        self.capacity = capacity;
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + '_ {
        self.order.iter().map(|key| {
            let entry = self.entries.get(key).expect("every listed key has an entry");
            (key, &entry.value)
        })
    }
}

impl<K, V, S> AnyLruCache<K, V> for LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        self.len()
    }
    fn cap(&self) -> NonZeroUsize {
        self.capacity
    }
    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.put(key, value)
    }
    fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key)
    }
    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_mut(key)
    }
    fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek(key)
    }
    fn clear(&mut self) {
        self.clear();
    }
    fn pop_lru(&mut self) -> Option<(K, V)> {
        self.pop_lru()
    }
}

impl<K, V, S> Clone for LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let mut copy = Self::with_hasher(self.capacity, self.entries.hasher().clone());
        for (key, value) in self.iter().rev() {
            copy.put(key.clone(), value.clone());
        }
        copy
    }
}

impl<K, V, S> fmt::Debug for LruCache<K, V, S>
where
    K: Hash + Eq + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
