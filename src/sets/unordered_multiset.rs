//! Hash multiset backed by the chained hash table.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter;

use fnv::FnvBuildHasher;

use crate::hash::hash_table::{self, HashTable};

/// A hash bag: every inserted value is kept, duplicates adjacent in their bucket.
pub struct UnorderedMultiSet<T, S = FnvBuildHasher> {
    table: HashTable<T, (), S>,
}

impl<T> UnorderedMultiSet<T> {
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
        }
    }
}

impl<T, S: Default> Default for UnorderedMultiSet<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S> UnorderedMultiSet<T, S> {
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

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.table.iter().map(|(k, _)| k)
    }
}

impl<T, S> UnorderedMultiSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    pub fn insert(&mut self, value: T) {
        self.table.insert_multi(value, ());
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains_key(value)
    }

    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.count(value)
    }

    /// Removes one occurrence of `value`.
    pub fn remove_one<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_unique(value).map(|(k, _)| k)
    }

    /// Removes every occurrence of `value`; returns how many there were.
    pub fn remove_all<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.remove_all(value)
    }

    pub fn reserve(&mut self, values: usize) {
        self.table.reserve(values);
    }
}

impl<T: Clone, S: Clone> Clone for UnorderedMultiSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for UnorderedMultiSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, S> Extend<T> for UnorderedMultiSet<T, S>
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

impl<T, S> FromIterator<T> for UnorderedMultiSet<T, S>
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

impl<T, S> IntoIterator for UnorderedMultiSet<T, S> {
    type Item = T;
    type IntoIter = iter::Map<hash_table::IntoIter<T, ()>, fn((T, ())) -> T>;

    fn into_iter(self) -> Self::IntoIter {
        fn value<T>((value, ()): (T, ())) -> T {
            value
        }
        self.table.into_iter().map(value as fn((T, ())) -> T)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unordered_multiset_counts() {
        let mut bag: UnorderedMultiSet<&str> = "a b a c a b".split(' ').collect();
        assert_eq!(bag.len(), 6);
        assert_eq!(bag.count("a"), 3);
        assert_eq!(bag.count("z"), 0);
        assert_eq!(bag.remove_one("a"), Some("a"));
        assert_eq!(bag.count("a"), 2);
        assert_eq!(bag.remove_all("b"), 2);
        assert!(!bag.contains("b"));
        bag.insert("c");
        let mut rest: Vec<&str> = bag.into_iter().collect();
        rest.sort_unstable();
        assert_eq!(rest, vec!["a", "a", "c", "c"]);
    }

    #[test]
    fn test_unordered_multiset_survives_rehash() {
        let mut bag: UnorderedMultiSet<u16> = UnorderedMultiSet::new();
        for i in 0..2000u16 {
            bag.insert(i % 50);
        }
        assert!(bag.bucket_count() >= 2000);
        assert!((0..50).all(|v| bag.count(&v) == 40));
        assert_eq!(bag.iter().len(), 2000);
    }
}
