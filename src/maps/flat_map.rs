//! Sorted map stored in one contiguous array.
//!
//! Lookups are binary searches; insertion and removal shift the tail. Good for small
//! maps or read-mostly data where cache locality beats the tree's O(log n) updates.

use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;
use core::slice;

use crate::error::{CollectionError, Result};
use crate::utils::compare::{Compare, NaturalOrder};
use crate::vecs::array::{self, DynArray};

pub struct FlatMap<K, V, C = NaturalOrder> {
    entries: DynArray<(K, V)>,
    compare: C,
}

impl<K, V> FlatMap<K, V> {
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DynArray::with_capacity(capacity),
            compare: NaturalOrder,
        }
    }
}

impl<K, V, C: Default> Default for FlatMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C> FlatMap<K, V, C> {
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            entries: DynArray::new(),
            compare,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in key order as a slice.
    pub fn as_slice(&self) -> &[(K, V)] {
        &self.entries
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.entries.first().map(|(k, v)| (k, v))
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.entries.last().map(|(k, v)| (k, v))
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (&K, &mut V)> + '_ {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.entries.retain_mut(|(k, v)| f(k, v));
    }

    /// Index of `key`, or the index where it would be inserted.
    fn search<Q>(&self, key: &Q) -> core::result::Result<usize, usize>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let index = self
            .entries
            .partition_point(|(k, _)| self.compare.less(k.borrow(), key));
        match self.entries.get(index) {
            Some((k, _)) if !self.compare.less(key, k.borrow()) => Ok(index),
            _ => Err(index),
        }
    }
}

impl<K, V, C: Compare<K>> FlatMap<K, V, C> {
    /// Inserts or assigns; returns the previous value for `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Ok(index) => Some(core::mem::replace(&mut self.entries[index].1, value)),
            Err(index) => {
                self.entries
                    .insert(index, (key, value))
                    .expect("search returns an index within bounds");
                None
            }
        }
    }

    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let index = match self.search(&key) {
            Ok(index) => index,
            Err(index) => {
                self.entries
                    .insert(index, (key, default()))
                    .expect("search returns an index within bounds");
                index
            }
        };
        &mut self.entries[index].1
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let index = self.search(key).ok()?;
        Some(&self.entries[index].1)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let index = self.search(key).ok()?;
        Some(&mut self.entries[index].1)
    }

    /// # Errors
    /// [`CollectionError::NotFound`] if `key` is absent.
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.get(key).ok_or(CollectionError::NotFound)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.search(key).is_ok()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let index = self.search(key).ok()?;
        self.entries.remove(index).ok().map(|(_, v)| v)
    }

    /// First entry whose key is not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let index = self.search(key).unwrap_or_else(|index| index);
        self.entries.get(index).map(|(k, v)| (k, v))
    }
}

impl<K, V, C, Q> Index<&Q> for FlatMap<K, V, C>
where
    K: Borrow<Q>,
    C: Compare<K> + Compare<Q>,
    Q: ?Sized,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for FlatMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            compare: self.compare.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for FlatMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for FlatMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq, C> Eq for FlatMap<K, V, C> {}

impl<K, V, C: Compare<K>> Extend<(K, V)> for FlatMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for FlatMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

pub struct Iter<'a, K, V> {
    inner: slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V, C> IntoIterator for FlatMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = array::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a FlatMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_map_keeps_entries_sorted() {
        let mut map = FlatMap::new();
        for k in [5, 3, 9, 1, 7] {
            assert_eq!(map.insert(k, k * 10), None);
        }
        assert_eq!(map.insert(3, 33), Some(30));
        let keys: Vec<i32> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 3, 5, 7, 9]);
        assert_eq!(map.first(), Some((&1, &10)));
        assert_eq!(map.last(), Some((&9, &90)));
        assert_eq!(map[&3], 33);
    }

    #[test]
    fn test_flat_map_lookup_and_remove() {
        let mut map: FlatMap<String, usize> = FlatMap::with_capacity(4);
        map.insert("b".into(), 2);
        map.insert("a".into(), 1);
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.at("z"), Err(CollectionError::NotFound));
        *map.get_or_insert_with("c".into(), || 0) += 3;
        assert_eq!(map.lower_bound("bb"), Some((&"c".to_string(), &3)));
        assert_eq!(map.remove("a"), Some(1));
        assert_eq!(map.remove("a"), None);
        assert!(map.contains_key("b"));
        map.retain(|k, _| k != "b");
        assert_eq!(map.len(), 1);
        assert_eq!(format!("{:?}", map), r#"{"c": 3}"#);
    }
}
