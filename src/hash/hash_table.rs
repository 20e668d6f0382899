//! Separate-chaining hash table.
//!
//! [`HashTable`] is the engine behind the unordered map and set family. Entries live
//! in an array of buckets, each a [`ForwardList`] chain. New keys go to the head of
//! their chain; entries sharing a key are kept next to each other, in insertion order,
//! so a run of duplicates can be found, counted and removed as a unit.
//!
//! # Growth
//! Before an insert that adds an entry, the table checks whether one more entry would
//! push `len / bucket_count` above the maximum load factor. If so every entry is moved
//! into a new bucket array of `max(bucket_count * 2, ceil((len + 1) / max_load_factor))`
//! chains, and only then is the target bucket computed.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use core::slice;

use fnv::FnvBuildHasher;

use crate::error::{CollectionError, Result};
use crate::lists::forward_list::{self, ForwardList};
use crate::vecs::array::{self, DynArray};

/// Bucket count of a default-constructed table.
pub const DEFAULT_BUCKET_COUNT: usize = 16;

/// Load factor a table starts with, and falls back to when given a non-positive one.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 1.0;

/// Smallest accepted maximum load factor. Lower values are raised to it.
pub const MIN_MAX_LOAD_FACTOR: f32 = 1.0 / 64.0;

type Bucket<K, V> = ForwardList<(K, V)>;

/// A chained hash table of `(K, V)` entries.
pub struct HashTable<K, V, S = FnvBuildHasher> {
    buckets: DynArray<Bucket<K, V>>,
    len: usize,
    max_load_factor: f32,
    hash_builder: S,
}

fn empty_buckets<K, V>(count: usize) -> DynArray<Bucket<K, V>> {
    let count = count.max(1);
    let mut buckets = DynArray::with_capacity(count);
    buckets.resize_with(count, ForwardList::new);
    buckets
}

/// Start index and length of the run of `key` in `bucket`.
fn run_of<K, V, Q>(bucket: &Bucket<K, V>, key: &Q) -> Option<(usize, usize)>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    let mut entries = bucket
        .iter()
        .enumerate()
        .skip_while(|(_, (k, _))| k.borrow() != key);
    let (start, _) = entries.next()?;
    let len = 1 + entries
        .take_while(|(_, (k, _))| k.borrow() == key)
        .count();
    Some((start, len))
}

impl<K, V, S: Default> HashTable<K, V, S> {
    pub fn new() -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKET_COUNT, S::default())
    }

    /// Creates a table with `bucket_count` chains (at least one).
    pub fn with_buckets(bucket_count: usize) -> Self {
        Self::with_buckets_and_hasher(bucket_count, S::default())
    }
}

impl<K, V, S: Default> Default for HashTable<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashTable<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKET_COUNT, hash_builder)
    }

    pub fn with_buckets_and_hasher(bucket_count: usize, hash_builder: S) -> Self {
        Self {
            buckets: empty_buckets(bucket_count),
            len: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            hash_builder,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of entries chained in bucket `index`.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= bucket_count()`.
    pub fn bucket_len(&self, index: usize) -> Result<usize> {
        self.buckets.at(index).map(ForwardList::len)
    }

    pub fn load_factor(&self) -> f32 {
        self.len as f32 / self.buckets.len() as f32
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Sets the load factor that triggers growth. Non-positive and NaN values reset it
    /// to [`DEFAULT_MAX_LOAD_FACTOR`]; positive values below [`MIN_MAX_LOAD_FACTOR`]
    /// are raised to it. Takes effect on the next insert.
    pub fn set_max_load_factor(&mut self, factor: f32) {
        self.max_load_factor = if factor > 0.0 {
            factor.max(MIN_MAX_LOAD_FACTOR)
        } else {
            DEFAULT_MAX_LOAD_FACTOR
        };
    }

    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes every entry. The bucket array is kept.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut len = 0;
        for bucket in self.buckets.iter_mut() {
            bucket.retain_mut(|(k, v)| f(k, v));
            len += bucket.len();
        }
        self.len = len;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            chain: None,
            remaining: self.len,
        }
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn index_for<Q: Hash + ?Sized>(&self, key: &Q, bucket_count: usize) -> usize {
        (self.hash_builder.hash_one(key) % bucket_count as u64) as usize
    }

    /// Bucket that `key` hashes to under the current bucket count.
    pub fn bucket_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.index_for(key, self.buckets.len())
    }

    fn bucket<Q>(&self, key: &Q) -> &Bucket<K, V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        &self.buckets[self.bucket_of(key)]
    }

    fn bucket_mut<Q>(&mut self, key: &Q) -> &mut Bucket<K, V>
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        let index = self.bucket_of(key);
        &mut self.buckets[index]
    }

    /// Grows the bucket array if one more entry would exceed the load factor.
    fn reserve_one(&mut self) {
        let needed = self.len + 1;
        let max_load = f64::from(self.max_load_factor);
        if needed as f64 / self.buckets.len() as f64 > max_load {
            let target = (needed as f64 / max_load).ceil() as usize;
            self.rehash(target.max(self.buckets.len().saturating_mul(2)));
        }
    }

    /// Chains an entry into its bucket: after its equal-key run if one exists,
    /// otherwise at the head.
    fn place(&mut self, key: K, value: V) -> &mut V {
        let bucket = self.bucket_mut(&key);
        match run_of(bucket, &key) {
            Some((start, len)) => {
                let entry = bucket
                    .insert_after(start + len, (key, value))
                    .expect("run end lies within the chain");
                &mut entry.1
            }
            None => &mut bucket.push_front((key, value)).1,
        }
    }

    /// Rebuilds the table with `bucket_count` chains (at least one), moving every
    /// entry. Equal-key runs keep their order.
    pub fn rehash(&mut self, bucket_count: usize) {
        let bucket_count = bucket_count.max(1);
        log::debug!(
            "rehashing hash table: {} -> {} buckets, len={}",
            self.buckets.len(),
            bucket_count,
            self.len
        );
        let old = mem::replace(&mut self.buckets, empty_buckets(bucket_count));
        for mut bucket in old {
            while let Ok((key, value)) = bucket.pop_front() {
                self.place(key, value);
            }
        }
    }

    /// Sizes the bucket array so `entries` entries fit under the load factor.
    pub fn reserve(&mut self, entries: usize) {
        let needed = (entries as f64 / f64::from(self.max_load_factor)) as usize + 1;
        if needed > self.buckets.len() {
            self.rehash(needed);
        }
    }

    pub fn find<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.bucket(key)
            .iter()
            .find(|(k, _)| k.borrow() == key)
            .map(|(k, v)| (k, v))
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<(&K, &mut V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.bucket_mut(key)
            .iter_mut()
            .find(|(k, _)| k.borrow() == key)
            .map(|(k, v)| (&*k, v))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// # Errors
    /// [`CollectionError::NotFound`] if `key` is absent.
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).map(|(_, v)| v).ok_or(CollectionError::NotFound)
    }

    /// # Errors
    /// [`CollectionError::NotFound`] if `key` is absent.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find_mut(key)
            .map(|(_, v)| v)
            .ok_or(CollectionError::NotFound)
    }

    /// Insert-or-assign.
    ///
    /// An existing entry has its value replaced in place (nothing is rehashed) and the
    /// old value is returned. A new key may trigger growth first.
    pub fn insert_unique(&mut self, key: K, value: V) -> Option<V> {
        if let Some((_, slot)) = self.find_mut(&key) {
            return Some(mem::replace(slot, value));
        }
        self.reserve_one();
        self.bucket_mut(&key).push_front((key, value));
        self.len += 1;
        None
    }

    /// Inserts unconditionally. A duplicate joins the end of its key's run.
    pub fn insert_multi(&mut self, key: K, value: V) -> &mut V {
        self.reserve_one();
        self.len += 1;
        self.place(key, value)
    }

    /// Value for `key`, inserting `default()` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let index = self.bucket_of(&key);
        if let Some(position) = self.buckets[index].position(|(k, _)| *k == key) {
            let entry = self.buckets[index]
                .get_mut(position)
                .expect("position found in this chain");
            return &mut entry.1;
        }
        let value = default();
        self.reserve_one();
        self.len += 1;
        let bucket = self.bucket_mut(&key);
        &mut bucket.push_front((key, value)).1
    }

    /// Removes the first entry with `key`.
    pub fn remove_unique<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.bucket_mut(key);
        let position = bucket.position(|(k, _)| k.borrow() == key)?;
        let entry = bucket.erase_after(position).ok()?;
        self.len -= 1;
        Some(entry)
    }

    /// Removes every entry with `key` and returns how many there were.
    pub fn remove_all<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.bucket_mut(key);
        let Some((start, len)) = run_of(bucket, key) else {
            return 0;
        };
        for _ in 0..len {
            drop(bucket.erase_after(start));
        }
        self.len -= len;
        len
    }

    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        run_of(self.bucket(key), key).map_or(0, |(_, len)| len)
    }

    /// All entries with `key`, in insertion order.
    pub fn equal_range<Q>(&self, key: &Q) -> EqualRange<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.bucket(key);
        let mut chain = bucket.iter();
        let remaining = match run_of(bucket, key) {
            Some((start, len)) => {
                if start > 0 {
                    chain.nth(start - 1);
                }
                len
            }
            None => 0,
        };
        EqualRange { chain, remaining }
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for HashTable<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            len: self.len,
            max_load_factor: self.max_load_factor,
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)`, bucket by bucket.
pub struct Iter<'a, K, V> {
    buckets: slice::Iter<'a, Bucket<K, V>>,
    chain: Option<forward_list::Iter<'a, (K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k, v)) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((k, v));
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            chain: self.chain.clone(),
            remaining: self.remaining,
        }
    }
}

pub struct IterMut<'a, K, V> {
    buckets: slice::IterMut<'a, Bucket<K, V>>,
    chain: Option<forward_list::IterMut<'a, (K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k, v)) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((&*k, v));
            }
            self.chain = Some(self.buckets.next()?.iter_mut());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

pub struct IntoIter<K, V> {
    buckets: array::IntoIter<Bucket<K, V>>,
    chain: Option<forward_list::IntoIter<(K, V)>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some(entry);
            }
            self.chain = Some(self.buckets.next()?.into_iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for HashTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            remaining: self.len,
            buckets: self.buckets.into_iter(),
            chain: None,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Iterator over one equal-key run, returned by [`HashTable::equal_range`].
pub struct EqualRange<'a, K, V> {
    chain: forward_list::Iter<'a, (K, V)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for EqualRange<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.chain.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for EqualRange<'_, K, V> {}
impl<K, V> FusedIterator for EqualRange<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    type Table<V> = HashTable<String, V>;

    #[test]
    fn test_hash_table_defaults() {
        let table: Table<i32> = HashTable::new();
        assert_eq!(table.bucket_count(), DEFAULT_BUCKET_COUNT);
        assert_eq!(table.max_load_factor(), 1.0);
        assert!(table.is_empty());
        let single: Table<i32> = HashTable::with_buckets(0);
        assert_eq!(single.bucket_count(), 1);
    }

    #[test]
    fn test_hash_table_insert_or_assign() {
        let mut table: Table<i32> = HashTable::new();
        assert_eq!(table.insert_unique("a".into(), 1), None);
        assert_eq!(table.insert_unique("a".into(), 2), Some(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.at("a"), Ok(&2));
        assert_eq!(table.at("b"), Err(CollectionError::NotFound));
        *table.at_mut("a").unwrap() += 1;
        assert_eq!(table.find("a"), Some((&"a".to_string(), &3)));
    }

    #[test]
    fn test_hash_table_grows_before_exceeding_load_factor() {
        let mut table: HashTable<u32, u32> = HashTable::with_buckets(4);
        for i in 0..4 {
            table.insert_unique(i, i);
        }
        assert_eq!(table.bucket_count(), 4);
        table.insert_unique(4, 4);
        assert_eq!(table.bucket_count(), 8);
        for i in 5..1000 {
            table.insert_unique(i, i);
            assert!(table.load_factor() <= table.max_load_factor());
        }
        for i in 0..1000 {
            assert_eq!(table.find(&i), Some((&i, &i)));
        }
    }

    #[test]
    fn test_hash_table_growth_honours_small_load_factor() {
        let mut table: HashTable<u32, ()> = HashTable::with_buckets(2);
        table.set_max_load_factor(0.25);
        table.insert_unique(1, ());
        assert!(table.bucket_count() >= 4);
        assert!(table.load_factor() <= 0.25);
        table.set_max_load_factor(-3.0);
        assert_eq!(table.max_load_factor(), 1.0);
        table.set_max_load_factor(f32::NAN);
        assert_eq!(table.max_load_factor(), 1.0);
    }

    #[test]
    fn test_hash_table_tiny_load_factor_is_clamped() {
        let mut table: HashTable<u32, u32> = HashTable::with_buckets(1);
        table.set_max_load_factor(f32::MIN_POSITIVE);
        assert_eq!(table.max_load_factor(), MIN_MAX_LOAD_FACTOR);
        table.insert_unique(1, 1);
        table.insert_unique(2, 2);
        assert!(table.load_factor() <= MIN_MAX_LOAD_FACTOR);
        assert_eq!(table.find(&2), Some((&2, &2)));
    }

    #[test]
    fn test_hash_table_get_or_insert_after_rehash() {
        let mut table: HashTable<u32, u32> = HashTable::with_buckets(1);
        *table.get_or_insert_with(1, || 10) += 1;
        let slot = table.get_or_insert_with(2, || 20);
        *slot += 2;
        assert_eq!(table.bucket_count(), 2);
        assert_eq!(table.find(&2), Some((&2, &22)));
        assert_eq!(table.find(&1), Some((&1, &11)));
        assert!(table.bucket_len(table.bucket_of(&2)).unwrap() >= 1);
        assert_eq!(table.bucket_len(2), Err(CollectionError::out_of_range(2, 2)));
    }

    #[test]
    fn test_hash_table_get_or_insert_panicking_default_leaves_table_unchanged() {
        let mut table: HashTable<u32, u32> = HashTable::with_buckets(1);
        table.insert_unique(1, 1);
        let result = catch_unwind(AssertUnwindSafe(|| {
            table.get_or_insert_with(2, || panic!("no default"));
        }));
        assert!(result.is_err());
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().count(), table.len());
        assert_eq!(table.find(&2), None);
        assert_eq!(*table.get_or_insert_with(2, || 7), 7);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_hash_table_multi_runs_stay_contiguous_and_ordered() {
        let mut table: HashTable<u32, &str> = HashTable::with_buckets(1);
        table.insert_multi(1, "a");
        table.insert_multi(2, "x");
        table.insert_multi(1, "b");
        table.insert_multi(3, "y");
        table.insert_multi(1, "c");
        assert_eq!(table.count(&1), 3);
        let run: Vec<&str> = table.equal_range(&1).map(|(_, v)| *v).collect();
        assert_eq!(run, vec!["a", "b", "c"]);

        table.rehash(64);
        let run: Vec<&str> = table.equal_range(&1).map(|(_, v)| *v).collect();
        assert_eq!(run, vec!["a", "b", "c"]);
        assert_eq!(table.len(), 5);

        assert_eq!(table.remove_unique(&1), Some((1, "a")));
        assert_eq!(table.remove_all(&1), 2);
        assert_eq!(table.remove_all(&1), 0);
        assert_eq!(table.count(&1), 0);
        assert_eq!(table.equal_range(&1).count(), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_hash_table_reserve_and_rehash() {
        let mut table: HashTable<u32, u32> = HashTable::new();
        table.reserve(100);
        assert_eq!(table.bucket_count(), 101);
        for i in 0..100 {
            table.insert_unique(i, i);
        }
        assert_eq!(table.bucket_count(), 101);
        table.rehash(0);
        assert_eq!(table.bucket_count(), 1);
        assert_eq!(table.len(), 100);
        assert_eq!(table.iter().count(), 100);
    }

    #[test]
    fn test_hash_table_iteration_and_retain() {
        let mut table: HashTable<u32, u32> = HashTable::new();
        for i in 0..50 {
            table.insert_unique(i, i);
        }
        for (_, v) in table.iter_mut() {
            *v *= 2;
        }
        table.retain(|k, v| {
            *v += 1;
            k % 2 == 0
        });
        assert_eq!(table.len(), 25);
        assert_eq!(table.iter().len(), 25);
        let mut entries: Vec<(u32, u32)> = table.clone().into_iter().collect();
        entries.sort_unstable();
        assert_eq!(entries[1], (2, 5));
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.bucket_count(), DEFAULT_BUCKET_COUNT);
    }
}
