//! Hash map with unique keys, backed by the chained hash table.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;

use fnv::FnvBuildHasher;

use crate::error::Result;
use crate::hash::hash_table::{self, HashTable};

/// A hash map using separate chaining. The default hasher is FNV.
///
/// # Examples
/// ```
/// use bedrock_collections::UnorderedMap;
///
/// let mut scores = UnorderedMap::new();
/// scores.insert("red", 1);
/// *scores.get_or_insert_with("blue", || 0) += 5;
/// assert_eq!(scores.at("blue"), Ok(&5));
/// ```
pub struct UnorderedMap<K, V, S = FnvBuildHasher> {
    table: HashTable<K, V, S>,
}

impl<K, V> UnorderedMap<K, V> {
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
        }
    }

    /// Creates a map sized to hold `capacity` entries without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FnvBuildHasher::default())
    }
}

impl<K, V, S: Default> Default for UnorderedMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> UnorderedMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::with_hasher(hash_builder),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let buckets =
            (capacity as f64 / f64::from(hash_table::DEFAULT_MAX_LOAD_FACTOR)) as usize + 1;
        Self {
            table: HashTable::with_buckets_and_hasher(
                buckets.max(hash_table::DEFAULT_BUCKET_COUNT),
                hash_builder,
            ),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    pub fn set_max_load_factor(&mut self, factor: f32) {
        self.table.set_max_load_factor(factor);
    }

    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.table.retain(f);
    }

    pub fn iter(&self) -> hash_table::Iter<'_, K, V> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> hash_table::IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.table.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.table.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.table.iter_mut().map(|(_, v)| v)
    }
}

impl<K, V, S> UnorderedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts or assigns; returns the previous value for `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.table.insert_unique(key, value)
    }

    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.table.get_or_insert_with(key, default)
    }

    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.table.get_or_insert_with(key, V::default)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find_mut(key).map(|(_, v)| v)
    }

    /// # Errors
    /// [`CollectionError::NotFound`](crate::CollectionError::NotFound) if `key` is absent.
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.at(key)
    }

    /// # Errors
    /// [`CollectionError::NotFound`](crate::CollectionError::NotFound) if `key` is absent.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.at_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains_key(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_unique(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_unique(key)
    }

    pub fn reserve(&mut self, entries: usize) {
        self.table.reserve(entries);
    }

    pub fn rehash(&mut self, bucket_count: usize) {
        self.table.rehash(bucket_count);
    }
}

impl<K, V, S, Q> Index<&Q> for UnorderedMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    /// Panics if `key` is absent.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for UnorderedMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for UnorderedMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.table, f)
    }
}

impl<K, V, S> PartialEq for UnorderedMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Hash + Eq, V: Eq, S: BuildHasher> Eq for UnorderedMap<K, V, S> {}

impl<K, V, S> Extend<(K, V)> for UnorderedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for UnorderedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for UnorderedMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        let mut map = Self::with_capacity(N);
        map.extend(entries);
        map
    }
}

impl<K, V, S> IntoIterator for UnorderedMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = hash_table::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a UnorderedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = hash_table::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut UnorderedMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = hash_table::IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
