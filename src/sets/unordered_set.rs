//! Hash set backed by the chained hash table.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;

use fnv::FnvBuildHasher;

use super::AnySet;
use crate::hash::hash_table::{self, HashTable};

/// A hash set. Values are stored as keys with a `()` payload.
pub struct UnorderedSet<T, S = FnvBuildHasher> {
    table: HashTable<T, (), S>,
}

impl<T> UnorderedSet<T> {
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
        }
    }
}

impl<T, S: Default> Default for UnorderedSet<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> UnorderedSet<T, S> {
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

    pub fn max_load_factor(&self) -> f32 {
        self.table.max_load_factor()
    }

    pub fn set_max_load_factor(&mut self, factor: f32) {
        self.table.set_max_load_factor(factor);
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.table.retain(|value, _| f(value));
    }
}

impl<T, S> UnorderedSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Returns `false` if the value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.table.contains_key(&value) {
            return false;
        }
        self.table.insert_unique(value, ());
        true
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains_key(value)
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.find(value).map(|(k, _)| k)
    }

    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_unique(value).is_some()
    }

    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_unique(value).map(|(k, _)| k)
    }

    pub fn reserve(&mut self, values: usize) {
        self.table.reserve(values);
    }

    pub fn rehash(&mut self, bucket_count: usize) {
        self.table.rehash(bucket_count);
    }

    pub fn is_subset<S2: AnySet<T>>(&self, other: &S2) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<T: Hash + Eq, S: BuildHasher> AnySet<T> for UnorderedSet<T, S> {
    fn len(&self) -> usize {
        self.table.len()
    }

    fn contains(&self, value: &T) -> bool {
        self.table.contains_key(value)
    }
}

impl<T: Clone, S: Clone> Clone for UnorderedSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for UnorderedSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S, O> PartialEq<O> for UnorderedSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
    O: AnySet<T>,
{
    fn eq(&self, other: &O) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<T: Hash + Eq, S: BuildHasher> Eq for UnorderedSet<T, S> {}

impl<T, S> Extend<T> for UnorderedSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, S> FromIterator<T> for UnorderedSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T: Hash + Eq, const N: usize> From<[T; N]> for UnorderedSet<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

pub struct Iter<'a, T> {
    inner: hash_table::Iter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T, S> IntoIterator for UnorderedSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a UnorderedSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

pub struct IntoIter<T> {
    inner: hash_table::IntoIter<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sets::TreeSet;
    use std::collections::HashSet;

    #[test]
    fn test_unordered_set_insert_contains_remove() {
        let mut set = UnorderedSet::new();
        assert!(set.insert("alpha".to_string()));
        assert!(!set.insert("alpha".to_string()));
        assert!(set.insert("beta".to_string()));
        assert!(set.contains("alpha"));
        assert_eq!(set.get("beta").map(String::as_str), Some("beta"));
        assert!(set.remove("alpha"));
        assert!(!set.remove("alpha"));
        assert_eq!(set.take("beta"), Some("beta".to_string()));
        assert!(set.is_empty());
    }

    #[test]
    fn test_unordered_set_equality_with_other_sets() {
        let ours: UnorderedSet<u32> = (0..100).collect();
        let std_set: HashSet<u32> = (0..100).collect();
        let tree: TreeSet<u32> = (0..100).rev().collect();
        assert_eq!(ours, std_set);
        assert!(ours == tree);
        let small = UnorderedSet::from([1u32, 2, 3]);
        assert!(small.is_subset(&ours));
        assert!(!ours.is_subset(&small));
    }

    #[test]
    fn test_unordered_set_growth_and_retain() {
        let mut set: UnorderedSet<u64> = UnorderedSet::new();
        set.set_max_load_factor(0.5);
        for i in 0..1000 {
            set.insert(i);
            assert!(set.load_factor() <= 0.5);
        }
        set.retain(|v| v % 10 == 0);
        assert_eq!(set.len(), 100);
        assert_eq!(set.iter().len(), 100);
        let mut values: Vec<u64> = set.into_iter().collect();
        values.sort_unstable();
        assert_eq!(values[..3], [0, 10, 20]);
    }
}
