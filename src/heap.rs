//! Array-backed d-ary heap and heap sort.
//!
//! [`DaryHeap`] keeps the element that orders *first* under its comparator on top, so
//! with the default [`NaturalOrder`] it is a min-heap; use [`MaxHeap`] (the
//! [`ReverseOrder`] alias) for a max-heap. The arity `D` is a const parameter: wider
//! heaps are shallower, trading more comparisons per level for fewer levels.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::slice;
use std::collections::BinaryHeap;

use crate::error::{CollectionError, Result};
use crate::utils::compare::{Compare, NaturalOrder, ReverseOrder};
use crate::vecs::array::DynArray;

/// A trait for abstraction over different priority queue types.
pub trait AnyHeap<T> {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn push(&mut self, item: T);
    fn pop(&mut self) -> Option<T>;
    fn peek(&self) -> Option<&T>;
    fn clear(&mut self);
}

impl<T: Ord> AnyHeap<T> for BinaryHeap<T> {
    fn len(&self) -> usize {
        self.len()
    }
    fn push(&mut self, item: T) {
        self.push(item);
    }
    fn pop(&mut self) -> Option<T> {
        self.pop()
    }
    fn peek(&self) -> Option<&T> {
        self.peek()
    }
    fn clear(&mut self) {
        self.clear();
    }
}

// --- Sift primitives ---

fn sift_up<T, F>(data: &mut [T], mut index: usize, arity: usize, before: &F)
where
    F: Fn(&T, &T) -> bool,
{
    while index > 0 {
        let parent = (index - 1) / arity;
        if !before(&data[index], &data[parent]) {
            break;
        }
        data.swap(index, parent);
        index = parent;
    }
}

fn sift_down<T, F>(data: &mut [T], mut index: usize, arity: usize, before: &F)
where
    F: Fn(&T, &T) -> bool,
{
    let len = data.len();
    loop {
        let first = index * arity + 1;
        if first >= len {
            break;
        }
        let last = (first + arity).min(len);
        let mut best = first;
        for child in first + 1..last {
            if before(&data[child], &data[best]) {
                best = child;
            }
        }
        if !before(&data[best], &data[index]) {
            break;
        }
        data.swap(index, best);
        index = best;
    }
}

fn heapify<T, F>(data: &mut [T], arity: usize, before: &F)
where
    F: Fn(&T, &T) -> bool,
{
    if data.len() < 2 {
        return;
    }
    for index in (0..=(data.len() - 2) / arity).rev() {
        sift_down(data, index, arity, before);
    }
}

/// Sorts `data` in ascending order in place, in O(n log n) with no allocation.
pub fn heap_sort<T: Ord>(data: &mut [T]) {
    heap_sort_by(data, NaturalOrder);
}

/// Sorts `data` in place so that it is ascending under `compare`. Not stable.
pub fn heap_sort_by<T, C: Compare<T>>(data: &mut [T], compare: C) {
    let after = |a: &T, b: &T| compare.less(b, a);
    heapify(data, 2, &after);
    for end in (1..data.len()).rev() {
        data.swap(0, end);
        sift_down(&mut data[..end], 0, 2, &after);
    }
}

// --- DaryHeap ---

/// A priority queue over a contiguous array with `D` children per node.
pub struct DaryHeap<T, C = NaturalOrder, const D: usize = 2> {
    data: DynArray<T>,
    compare: C,
}

/// A binary heap with the greatest element on top.
pub type MaxHeap<T> = DaryHeap<T, ReverseOrder>;

impl<T: Ord> DaryHeap<T> {
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Builds a heap from `values` in O(n).
    pub fn from_vec(values: Vec<T>) -> Self {
        Self::from_array(values.into_iter().collect(), NaturalOrder)
    }
}

impl<T, C: Default, const D: usize> Default for DaryHeap<T, C, D> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C, const D: usize> DaryHeap<T, C, D> {
    pub const fn with_comparator(compare: C) -> Self {
        const { assert!(D >= 2, "DaryHeap needs at least two children per node") };
        Self {
            data: DynArray::new(),
            compare,
        }
    }

    pub fn with_capacity_and_comparator(capacity: usize, compare: C) -> Self {
        let mut heap = Self::with_comparator(compare);
        heap.data.reserve(capacity);
        heap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the heap holds nothing.
    pub fn top(&self) -> Result<&T> {
        self.peek().ok_or(CollectionError::Empty)
    }

    /// Elements in heap (not sorted) order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn comparator(&self) -> &C {
        &self.compare
    }
}

impl<T, C: Compare<T>, const D: usize> DaryHeap<T, C, D> {
    /// Builds a heap from an unordered array in O(n).
    pub fn from_array(mut data: DynArray<T>, compare: C) -> Self {
        heapify(&mut data, D, &|a: &T, b: &T| compare.less(a, b));
        let mut heap = Self::with_comparator(compare);
        heap.data = data;
        heap
    }

    pub fn push(&mut self, item: T) {
        self.data.push(item);
        let last = self.data.len() - 1;
        let compare = &self.compare;
        sift_up(&mut self.data, last, D, &|a: &T, b: &T| compare.less(a, b));
    }

    pub fn pop(&mut self) -> Option<T> {
        let last = self.data.len().checked_sub(1)?;
        self.data.swap(0, last);
        let top = self.data.pop();
        self.restore_from_root();
        top
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the heap holds nothing.
    pub fn try_pop(&mut self) -> Result<T> {
        self.pop().ok_or(CollectionError::Empty)
    }

    /// Mutable access to the top element. The heap is repaired when the guard drops.
    pub fn peek_mut(&mut self) -> Option<PeekMut<'_, T, C, D>> {
        if self.data.is_empty() {
            None
        } else {
            Some(PeekMut { heap: self })
        }
    }

    /// Consumes the heap, returning its elements in pop order.
    pub fn into_sorted(mut self) -> DynArray<T> {
        let mut out = DynArray::with_capacity(self.data.len());
        while let Some(item) = self.pop() {
            out.push(item);
        }
        out
    }

    fn restore_from_root(&mut self) {
        let compare = &self.compare;
        sift_down(&mut self.data, 0, D, &|a: &T, b: &T| compare.less(a, b));
    }
}

impl<T, C: Compare<T>, const D: usize> AnyHeap<T> for DaryHeap<T, C, D> {
    fn len(&self) -> usize {
        self.data.len()
    }
    fn push(&mut self, item: T) {
        DaryHeap::push(self, item);
    }
    fn pop(&mut self) -> Option<T> {
        DaryHeap::pop(self)
    }
    fn peek(&self) -> Option<&T> {
        self.data.first()
    }
    fn clear(&mut self) {
        self.data.clear();
    }
}

/// Guard returned by [`DaryHeap::peek_mut`].
pub struct PeekMut<'a, T, C: Compare<T>, const D: usize> {
    heap: &'a mut DaryHeap<T, C, D>,
}

impl<T, C: Compare<T>, const D: usize> PeekMut<'_, T, C, D> {
    /// Removes the peeked element.
    pub fn pop(this: Self) -> T {
        let mut this = core::mem::ManuallyDrop::new(this);
        this.heap
            .pop()
            .expect("PeekMut is only created for a non-empty heap")
    }
}

impl<T, C: Compare<T>, const D: usize> Deref for PeekMut<'_, T, C, D> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.heap.data[0]
    }
}

impl<T, C: Compare<T>, const D: usize> DerefMut for PeekMut<'_, T, C, D> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.heap.data[0]
    }
}

impl<T, C: Compare<T>, const D: usize> Drop for PeekMut<'_, T, C, D> {
    fn drop(&mut self) {
        self.heap.restore_from_root();
    }
}

impl<T: Clone, C: Clone, const D: usize> Clone for DaryHeap<T, C, D> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            compare: self.compare.clone(),
        }
    }
}

impl<T: fmt::Debug, C, const D: usize> fmt::Debug for DaryHeap<T, C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

impl<T, C: Compare<T>, const D: usize> Extend<T> for DaryHeap<T, C, D> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.data.reserve(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<T, C: Compare<T> + Default, const D: usize> FromIterator<T> for DaryHeap<T, C, D> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_array(iter.into_iter().collect(), C::default())
    }
}

impl<T, C, const D: usize> IntoIterator for DaryHeap<T, C, D> {
    type Item = T;
    type IntoIter = crate::vecs::array::IntoIter<T>;

    /// Elements in heap order.
    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
