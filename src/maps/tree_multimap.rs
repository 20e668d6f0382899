//! Ordered map that allows several entries per key.

use core::borrow::Borrow;
use core::fmt;

use crate::tree::rb_tree::{self, First, RbTree};
use crate::tree::NodeRef;
use crate::utils::compare::{Compare, NaturalOrder};

/// A sorted multimap. Entries with equal keys are kept in insertion order.
pub struct TreeMultiMap<K, V, C = NaturalOrder> {
    tree: RbTree<(K, V), First, C>,
}

impl<K, V> TreeMultiMap<K, V> {
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C: Default> Default for TreeMultiMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C> TreeMultiMap<K, V, C> {
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

    /// Entry at `node`, if it is still present.
    pub fn get_entry(&self, node: NodeRef) -> Option<(&K, &V)> {
        self.tree.get(node).map(|(k, v)| (k, v))
    }

    /// Removes the entry at `node`. Returns `None` if it was already removed.
    pub fn remove_entry_at(&mut self, node: NodeRef) -> Option<(K, V)> {
        self.tree.erase(node).map(|(entry, _)| entry)
    }

    /// Entries in key order; equal keys in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + '_ {
        self.tree.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (&K, &mut V)> + '_ {
        self.tree.iter_mut().map(|(k, v)| (&*k, v))
    }
}

impl<K, V, C: Compare<K>> TreeMultiMap<K, V, C> {
    /// Adds an entry after any existing entries with the same key.
    pub fn insert(&mut self, key: K, value: V) -> NodeRef {
        self.tree.insert_multi((key, value))
    }

    /// First value inserted under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.find(key)?;
        self.tree.get(node).map(|(_, v)| v)
    }

    /// Every value stored under `key`, oldest first.
    pub fn get_all<Q>(&self, key: &Q) -> impl DoubleEndedIterator<Item = &V> + '_
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.equal_range(key).map(|(_, v)| v)
    }

    pub fn find<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(key).is_some()
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.count(key)
    }

    /// Removes the oldest entry stored under `key`.
    pub fn remove_one<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.find(key)?;
        self.remove_entry_at(node)
    }

    /// Removes every entry stored under `key` and returns how many there were.
    pub fn remove_all<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.erase_equal(key)
    }

    /// Entries with keys in `[low, high)`.
    pub fn range<Q>(&self, low: &Q, high: &Q) -> impl DoubleEndedIterator<Item = (&K, &V)> + '_
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.key_range(low, high).map(|(k, v)| (k, v))
    }
}

impl<K: Clone, V: Clone, C: Compare<K> + Clone> Clone for TreeMultiMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for TreeMultiMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for TreeMultiMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for TreeMultiMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C> IntoIterator for TreeMultiMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = rb_tree::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}
