//! Ordered set backed by the red-black tree.
//!
//! [`TreeSet`] stores each value once, in ascending order under its comparator.
//! Equality is checked against any [`AnySet`], so a `TreeSet` compares equal to an
//! `UnorderedSet` or a `std` set holding the same values.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;

use super::AnySet;
use crate::tree::rb_tree::{self, Identity, RbTree};
use crate::utils::compare::{Compare, NaturalOrder};

/// A sorted set of unique values.
pub struct TreeSet<T, C = NaturalOrder> {
    tree: RbTree<T, Identity, C>,
}

impl<T> TreeSet<T> {
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T, C: Default> Default for TreeSet<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C> TreeSet<T, C> {
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

    pub fn pop_first(&mut self) -> Option<T> {
        let node = self.tree.first()?;
        self.tree.erase(node).map(|(value, _)| value)
    }

    pub fn pop_last(&mut self) -> Option<T> {
        let node = self.tree.last()?;
        self.tree.erase(node).map(|(value, _)| value)
    }

    /// Values in ascending order.
    pub fn iter(&self) -> rb_tree::Iter<'_, T> {
        self.tree.iter()
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.tree.first();
        while let Some(node) = cursor {
            let keep = match self.tree.get(node) {
                Some(value) => f(value),
                None => break,
            };
            cursor = if keep {
                self.tree.successor(node)
            } else {
                self.tree.erase(node).and_then(|(_, next)| next)
            };
        }
    }
}

impl<T, C: Compare<T>> TreeSet<T, C> {
    /// Adds `value`. Returns `false` (dropping `value`) if an equal value is present.
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert_unique(value).1.is_none()
    }

    /// Adds `value`, replacing and returning an equal value already present.
    pub fn replace(&mut self, value: T) -> Option<T> {
        let (node, rejected) = self.tree.insert_unique(value);
        let value = rejected?;
        let slot = self
            .tree
            .get_mut(node)
            .expect("insert_unique returns a live position");
        Some(core::mem::replace(slot, value))
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(value).is_some()
    }

    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(value).and_then(|node| self.tree.get(node))
    }

    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.take(value).is_some()
    }

    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.find(value)?;
        self.tree.erase(node).map(|(value, _)| value)
    }

    /// Smallest value not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.lower_bound(value).and_then(|node| self.tree.get(node))
    }

    /// Smallest value greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.upper_bound(value).and_then(|node| self.tree.get(node))
    }

    /// Values in `[low, high)`.
    pub fn range<Q>(&self, low: &Q, high: &Q) -> rb_tree::Iter<'_, T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.key_range(low, high)
    }
}

impl<T, C: Compare<T>> AnySet<T> for TreeSet<T, C> {
    fn len(&self) -> usize {
        self.tree.len()
    }

    fn contains(&self, value: &T) -> bool {
        TreeSet::contains(self, value)
    }
}

impl<T: Clone, C: Compare<T> + Clone> Clone for TreeSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for TreeSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C, S> PartialEq<S> for TreeSet<T, C>
where
    C: Compare<T>,
    S: AnySet<T>,
{
    fn eq(&self, other: &S) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<T, C: Compare<T>> Eq for TreeSet<T, C> {}

impl<T: Ord, C: Compare<T>> PartialOrd for TreeSet<T, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord, C: Compare<T>> Ord for TreeSet<T, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, C: Compare<T>> Extend<T> for TreeSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for TreeSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for TreeSet<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, C> IntoIterator for TreeSet<T, C> {
    type Item = T;
    type IntoIter = rb_tree::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a TreeSet<T, C> {
    type Item = &'a T;
    type IntoIter = rb_tree::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_tree_set_sorted_unique() {
        let mut set = TreeSet::new();
        assert!(set.insert(5));
        assert!(set.insert(1));
        assert!(!set.insert(5));
        assert!(set.insert(3));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(set.first(), Some(&1));
        assert_eq!(set.last(), Some(&5));
        assert!(set.contains(&3));
        assert!(set.remove(&3));
        assert!(!set.remove(&3));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_tree_set_bounds_and_range() {
        let set: TreeSet<u32> = (0..20).step_by(2).collect();
        assert_eq!(set.lower_bound(&5), Some(&6));
        assert_eq!(set.upper_bound(&6), Some(&8));
        assert_eq!(set.upper_bound(&18), None);
        assert_eq!(set.range(&3, &9).copied().collect::<Vec<_>>(), vec![4, 6, 8]);
    }

    #[test]
    fn test_tree_set_equality_across_set_types() {
        let ours = TreeSet::from([3, 1, 2]);
        let std_set: BTreeSet<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(ours, std_set);
        assert!(ours < TreeSet::from([1, 2, 4]));
        assert_eq!(format!("{:?}", ours), "{1, 2, 3}");
    }

    #[test]
    fn test_tree_set_replace_take_retain() {
        let s = |text: &str| text.to_string();
        let mut set = TreeSet::with_comparator(|a: &String, b: &String| a.len() < b.len());
        set.insert(s("aa"));
        set.insert(s("b"));
        assert_eq!(set.replace(s("cc")), Some(s("aa")));
        assert_eq!(set.get(&s("xx")), Some(&s("cc")));
        set.extend([s("dddd"), s("eee")]);
        set.retain(|v| v.len() != 3);
        assert_eq!(set.take(&s("z")), Some(s("b")));
        assert_eq!(set.pop_first(), Some(s("cc")));
        assert_eq!(set.pop_last(), Some(s("dddd")));
        assert!(set.is_empty());
    }
}
