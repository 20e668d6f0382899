//! Ordered multiset backed by the red-black tree.

use core::borrow::Borrow;
use core::fmt;

use crate::tree::rb_tree::{self, Identity, RbTree};
use crate::utils::compare::{Compare, NaturalOrder};

/// A sorted collection that keeps every inserted value, duplicates included.
/// Equal values stay in insertion order.
pub struct TreeMultiSet<T, C = NaturalOrder> {
    tree: RbTree<T, Identity, C>,
}

impl<T> TreeMultiSet<T> {
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T, C: Default> Default for TreeMultiSet<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C> TreeMultiSet<T, C> {
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            tree: RbTree::with_comparator(compare),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.first().and_then(|node| self.tree.get(node))
    }

    pub fn last(&self) -> Option<&T> {
        self.tree.last().and_then(|node| self.tree.get(node))
    }

    pub fn iter(&self) -> rb_tree::Iter<'_, T> {
        self.tree.iter()
    }
}

impl<T, C: Compare<T>> TreeMultiSet<T, C> {
    pub fn insert(&mut self, value: T) {
        self.tree.insert_multi(value);
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(value).is_some()
    }

    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.count(value)
    }

    /// All stored values equivalent to `value`, oldest first.
    pub fn equal_range<Q>(&self, value: &Q) -> rb_tree::Iter<'_, T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.equal_range(value)
    }

    /// Removes one occurrence (the oldest) of `value`.
    pub fn remove_one<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.find(value)?;
        self.tree.erase(node).map(|(value, _)| value)
    }

    /// Removes every occurrence of `value`; returns how many there were.
    pub fn remove_all<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.erase_equal(value)
    }

    pub fn lower_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.lower_bound(value).and_then(|node| self.tree.get(node))
    }

    pub fn upper_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.upper_bound(value).and_then(|node| self.tree.get(node))
    }
}

impl<T: Clone, C: Compare<T> + Clone> Clone for TreeMultiSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for TreeMultiSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for TreeMultiSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for TreeMultiSet<T, C> {}

impl<T, C: Compare<T>> Extend<T> for TreeMultiSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for TreeMultiSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T, C> IntoIterator for TreeMultiSet<T, C> {
    type Item = T;
    type IntoIter = rb_tree::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a TreeMultiSet<T, C> {
    type Item = &'a T;
    type IntoIter = rb_tree::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
