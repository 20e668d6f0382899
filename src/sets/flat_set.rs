//! Sorted set stored in one contiguous array.

use core::borrow::Borrow;
use core::fmt;
use core::slice;

use super::AnySet;
use crate::utils::compare::{Compare, NaturalOrder};
use crate::vecs::array::{self, DynArray};

pub struct FlatSet<T, C = NaturalOrder> {
    values: DynArray<T>,
    compare: C,
}

impl<T> FlatSet<T> {
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T, C: Default> Default for FlatSet<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C> FlatSet<T, C> {
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            values: DynArray::new(),
            compare,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn first(&self) -> Option<&T> {
        self.values.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut f: F) {
        self.values.retain(|v| f(v));
    }

    fn search<Q>(&self, value: &Q) -> Result<usize, usize>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let index = self
            .values
            .partition_point(|v| self.compare.less(v.borrow(), value));
        match self.values.get(index) {
            Some(v) if !self.compare.less(value, v.borrow()) => Ok(index),
            _ => Err(index),
        }
    }
}

impl<T, C: Compare<T>> FlatSet<T, C> {
    /// Returns `false` if an equal value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        match self.search(&value) {
            Ok(_) => false,
            Err(index) => {
                self.values
                    .insert(index, value)
                    .expect("search returns an index within bounds");
                true
            }
        }
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.search(value).is_ok()
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.search(value).ok().map(|index| &self.values[index])
    }

    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        match self.search(value) {
            Ok(index) => self.values.remove(index).is_ok(),
            Err(_) => false,
        }
    }

    /// Smallest value not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let index = self.search(value).unwrap_or_else(|index| index);
        self.values.get(index)
    }
}

impl<T, C: Compare<T>> AnySet<T> for FlatSet<T, C> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn contains(&self, value: &T) -> bool {
        FlatSet::contains(self, value)
    }
}

impl<T: Clone, C: Clone> Clone for FlatSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            compare: self.compare.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for FlatSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C, S> PartialEq<S> for FlatSet<T, C>
where
    C: Compare<T>,
    S: AnySet<T>,
{
    fn eq(&self, other: &S) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<T, C: Compare<T>> Eq for FlatSet<T, C> {}

impl<T, C: Compare<T>> Extend<T> for FlatSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for FlatSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, C> IntoIterator for FlatSet<T, C> {
    type Item = T;
    type IntoIter = array::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a FlatSet<T, C> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sets::TreeSet;

    #[test]
    fn test_flat_set_sorted_unique() {
        let mut set: FlatSet<i32> = [4, 2, 8, 2, 6].into_iter().collect();
        assert_eq!(set.as_slice(), &[2, 4, 6, 8]);
        assert!(!set.insert(4));
        assert!(set.insert(5));
        assert_eq!(set.lower_bound(&7), Some(&8));
        assert_eq!(set.lower_bound(&9), None);
        assert!(set.remove(&2));
        assert!(!set.remove(&2));
        assert_eq!(set.first(), Some(&4));
        assert_eq!(set.last(), Some(&8));
    }

    #[test]
    fn test_flat_set_matches_tree_set() {
        let flat: FlatSet<&str> = ["pear", "apple", "fig"].into_iter().collect();
        let tree: TreeSet<&str> = ["fig", "pear", "apple"].into_iter().collect();
        assert_eq!(flat, tree);
        assert!(flat.contains("fig"));
        assert_eq!(flat.get("apple"), Some(&"apple"));
        assert_eq!(format!("{:?}", flat), r#"{"apple", "fig", "pear"}"#);
    }
}
