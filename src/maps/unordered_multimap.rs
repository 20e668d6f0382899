//! Hash map that allows several entries per key.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

use fnv::FnvBuildHasher;

use crate::hash::hash_table::{self, HashTable};

/// A hash multimap. Entries sharing a key sit next to each other in their bucket,
/// oldest first.
pub struct UnorderedMultiMap<K, V, S = FnvBuildHasher> {
    table: HashTable<K, V, S>,
}

impl<K, V> UnorderedMultiMap<K, V> {
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
        }
    }
}

impl<K, V, S: Default> Default for UnorderedMultiMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> UnorderedMultiMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::with_hasher(hash_builder),
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

    pub fn iter(&self) -> hash_table::Iter<'_, K, V> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> hash_table::IterMut<'_, K, V> {
        self.table.iter_mut()
    }
}

impl<K, V, S> UnorderedMultiMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Adds an entry; it goes after any entries already stored under `key`.
    pub fn insert(&mut self, key: K, value: V) -> &mut V {
        self.table.insert_multi(key, value)
    }

    /// Oldest value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(key).map(|(_, v)| v)
    }

    /// Every value stored under `key`, oldest first.
    pub fn get_all<Q>(&self, key: &Q) -> impl ExactSizeIterator<Item = &V> + '_
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.equal_range(key).map(|(_, v)| v)
    }

    pub fn equal_range<Q>(&self, key: &Q) -> hash_table::EqualRange<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.equal_range(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains_key(key)
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.count(key)
    }

    /// Removes the oldest entry stored under `key`.
    pub fn remove_one<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_unique(key)
    }

    /// Removes every entry stored under `key`; returns how many there were.
    pub fn remove_all<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_all(key)
    }

    pub fn reserve(&mut self, entries: usize) {
        self.table.reserve(entries);
    }

    pub fn rehash(&mut self, bucket_count: usize) {
        self.table.rehash(bucket_count);
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for UnorderedMultiMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for UnorderedMultiMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.table, f)
    }
}

impl<K, V, S> Extend<(K, V)> for UnorderedMultiMap<K, V, S>
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

impl<K, V, S> FromIterator<(K, V)> for UnorderedMultiMap<K, V, S>
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

impl<K, V, S> IntoIterator for UnorderedMultiMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = hash_table::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unordered_multimap_groups_values() {
        let mut map = UnorderedMultiMap::new();
        map.insert("fruit", "apple");
        map.insert("veg", "leek");
        map.insert("fruit", "pear");
        *map.insert("fruit", "plum") = "fig";
        assert_eq!(map.len(), 4);
        assert_eq!(map.count("fruit"), 3);
        assert_eq!(
            map.get_all("fruit").copied().collect::<Vec<_>>(),
            vec!["apple", "pear", "fig"]
        );
        assert_eq!(map.get("veg"), Some(&"leek"));
        assert_eq!(map.get_all("nut").len(), 0);
    }

    #[test]
    fn test_unordered_multimap_runs_survive_growth() {
        let mut map: UnorderedMultiMap<u32, u32> = (0..200).map(|i| (i % 7, i)).collect();
        map.rehash(3);
        map.reserve(1000);
        for key in 0..7 {
            let values: Vec<u32> = map.get_all(&key).copied().collect();
            let expected: Vec<u32> = (0..200).filter(|i| i % 7 == key).collect();
            assert_eq!(values, expected);
        }
    }

    #[test]
    fn test_unordered_multimap_remove() {
        let mut map: UnorderedMultiMap<char, i32> =
            [('a', 1), ('b', 2), ('a', 3)].into_iter().collect();
        assert_eq!(map.remove_one(&'a'), Some(('a', 1)));
        assert_eq!(map.get(&'a'), Some(&3));
        assert_eq!(map.remove_all(&'a'), 1);
        assert!(!map.contains_key(&'a'));
        assert_eq!(map.len(), 1);
    }
}
