//! Set adapters over the tree, the hash table and a sorted array.

use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};

pub mod flat_set;
pub mod tree_multiset;
pub mod tree_set;
pub mod unordered_multiset;
pub mod unordered_set;

pub use flat_set::FlatSet;
pub use tree_multiset::TreeMultiSet;
pub use tree_set::TreeSet;
pub use unordered_multiset::UnorderedMultiSet;
pub use unordered_set::UnorderedSet;

/// A read-only view of a set, used to compare sets of different kinds.
pub trait AnySet<T> {
    /// Returns the number of elements in the set.
    fn len(&self) -> usize;

    /// Returns `true` if the set contains no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the set contains the value.
    fn contains(&self, value: &T) -> bool;
}

impl<T, S> AnySet<T> for HashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        HashSet::contains(self, value)
    }
}

impl<T: Ord> AnySet<T> for BTreeSet<T> {
    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        BTreeSet::contains(self, value)
    }
}
