//! Ordered map with unique keys, backed by the red-black tree.

use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::error::{CollectionError, Result};
use crate::tree::rb_tree::{self, First, RbTree};
use crate::utils::compare::{Compare, NaturalOrder};

/// A sorted map. Keys are ordered by `C`, which defaults to `Ord`.
///
/// # Examples
/// ```
/// use bedrock_collections::TreeMap;
///
/// let mut ages = TreeMap::new();
/// ages.insert("bob", 31);
/// ages.insert("alice", 27);
/// assert_eq!(ages.first_key_value(), Some((&"alice", &27)));
/// assert_eq!(ages.insert("bob", 32), Some(31));
/// ```
pub struct TreeMap<K, V, C = NaturalOrder> {
    tree: RbTree<(K, V), First, C>,
}

impl<K, V> TreeMap<K, V> {
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C: Default> Default for TreeMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C> TreeMap<K, V, C> {
    /// Creates an empty map ordered by `compare`.
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

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let node = self.tree.first()?;
        self.tree.get(node).map(|(k, v)| (k, v))
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let node = self.tree.last()?;
        self.tree.get(node).map(|(k, v)| (k, v))
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let node = self.tree.first()?;
        self.tree.erase(node).map(|(entry, _)| entry)
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let node = self.tree.last()?;
        self.tree.erase(node).map(|(entry, _)| entry)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.tree.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = self.tree.first();
        while let Some(node) = cursor {
            let keep = match self.tree.get_mut(node) {
                Some((k, v)) => f(k, v),
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

impl<K, V, C: Compare<K>> TreeMap<K, V, C> {
    /// Inserts or assigns. Returns the previous value if `key` was present; the
    /// stored key is left untouched in that case.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (node, rejected) = self.tree.insert_unique((key, value));
        let (_, value) = rejected?;
        let slot = self
            .tree
            .get_mut(node)
            .expect("insert_unique returns a live position");
        Some(core::mem::replace(&mut slot.1, value))
    }

    /// Value for `key`, inserting `default()` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let node = match self.tree.find(&key) {
            Some(node) => node,
            None => self.tree.insert_unique((key, default())).0,
        };
        &mut self
            .tree
            .get_mut(node)
            .expect("position was just found or inserted")
            .1
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.find(key)?;
        self.tree.get(node).map(|(k, v)| (k, v))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.find(key)?;
        self.tree.get_mut(node).map(|(_, v)| v)
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

    /// # Errors
    /// [`CollectionError::NotFound`] if `key` is absent.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.get_mut(key).ok_or(CollectionError::NotFound)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.tree.find(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.find(key)?;
        self.tree.erase(node).map(|(entry, _)| entry)
    }

    /// First entry whose key is not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.lower_bound(key)?;
        self.tree.get(node).map(|(k, v)| (k, v))
    }

    /// First entry whose key is greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let node = self.tree.upper_bound(key)?;
        self.tree.get(node).map(|(k, v)| (k, v))
    }

    /// Entries with keys in `[low, high)`.
    pub fn range<Q>(&self, low: &Q, high: &Q) -> Iter<'_, K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Iter {
            inner: self.tree.key_range(low, high),
        }
    }
}

impl<K, V, C, Q> Index<&Q> for TreeMap<K, V, C>
where
    K: Borrow<Q>,
    C: Compare<K> + Compare<Q>,
    Q: ?Sized,
{
    type Output = V;

    /// # Panics
    /// Panics if `key` is absent.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Clone, V: Clone, C: Compare<K> + Clone> Clone for TreeMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for TreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for TreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for TreeMap<K, V, C> {}

impl<K, V, C: Compare<K>> Extend<(K, V)> for TreeMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for TreeMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for TreeMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

pub struct Iter<'a, K, V> {
    inner: rb_tree::Iter<'a, (K, V)>,
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

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct IterMut<'a, K, V> {
    inner: rb_tree::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (&*k, v))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K, V, C> IntoIterator for TreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = rb_tree::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a TreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut TreeMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::compare::ReverseOrder;

    #[test]
    fn test_tree_map_insert_or_assign() {
        let mut map = TreeMap::new();
        assert_eq!(map.insert(3, "c"), None);
        assert_eq!(map.insert(1, "a"), None);
        assert_eq!(map.insert(3, "C"), Some("c"));
        assert_eq!(map.len(), 2);
        assert_eq!(map[&3], "C");
        assert_eq!(map.at(&2), Err(CollectionError::NotFound));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&1, &"a"), (&3, &"C")]);
    }

    #[test]
    fn test_tree_map_borrowed_lookup_and_remove() {
        let mut map: TreeMap<String, u32> = TreeMap::new();
        map.insert("one".to_string(), 1);
        map.insert("two".to_string(), 2);
        assert_eq!(map.get("two"), Some(&2));
        *map.get_mut("one").unwrap() += 10;
        assert_eq!(map.remove("one"), Some(11));
        assert_eq!(map.remove("one"), None);
        assert!(!map.contains_key("one"));
        assert!(map.contains_key("two"));
    }

    #[test]
    fn test_tree_map_bounds_and_range() {
        let map: TreeMap<i32, i32> = (0..10).map(|i| (i * 10, i)).collect();
        assert_eq!(map.lower_bound(&25), Some((&30, &3)));
        assert_eq!(map.lower_bound(&30), Some((&30, &3)));
        assert_eq!(map.upper_bound(&30), Some((&40, &4)));
        assert_eq!(map.upper_bound(&90), None);
        let keys: Vec<i32> = map.range(&15, &45).map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![20, 30, 40]);
        assert_eq!(map.range(&45, &15).count(), 0);
        let back: Vec<i32> = map.keys().rev().take(2).copied().collect();
        assert_eq!(back, vec![90, 80]);
    }

    #[test]
    fn test_tree_map_first_last_pop() {
        let mut map = TreeMap::from([(2, 'b'), (1, 'a'), (3, 'c')]);
        assert_eq!(map.first_key_value(), Some((&1, &'a')));
        assert_eq!(map.last_key_value(), Some((&3, &'c')));
        assert_eq!(map.pop_first(), Some((1, 'a')));
        assert_eq!(map.pop_last(), Some((3, 'c')));
        assert_eq!(map.pop_last(), Some((2, 'b')));
        assert_eq!(map.pop_first(), None);
    }

    #[test]
    fn test_tree_map_get_or_insert_and_retain() {
        let mut counts: TreeMap<char, usize> = TreeMap::new();
        for c in "mississippi".chars() {
            *counts.get_or_insert_with(c, || 0) += 1;
        }
        assert_eq!(counts.at(&'s'), Ok(&4));
        assert_eq!(counts.at(&'m'), Ok(&1));
        for v in counts.values_mut() {
            *v *= 2;
        }
        counts.retain(|_, v| *v > 2);
        assert_eq!(counts.keys().copied().collect::<String>(), "ips");
    }

    #[test]
    fn test_tree_map_custom_order_and_clone() {
        let mut map: TreeMap<i32, (), ReverseOrder> = TreeMap::with_comparator(ReverseOrder);
        map.extend([(1, ()), (5, ()), (3, ())]);
        let copy = map.clone();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(copy.keys().copied().collect::<Vec<_>>(), vec![5, 3, 1]);
        assert_eq!(format!("{:?}", copy), "{5: (), 3: (), 1: ()}");
    }
}
