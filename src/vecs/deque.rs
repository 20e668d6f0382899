//! Growable double-ended queue over a circular buffer.
//!
//! [`Deque`] keeps its elements in one [`RawBuf`] addressed by a `head` index and a
//! length. Logical index `i` lives in physical slot `(head + i) % capacity`, so both
//! ends push and pop in O(1). When the buffer fills up, the elements are relocated
//! in logical order to the start of a buffer at least twice as large.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, IndexMut};
use core::ptr;
use core::slice;

use crate::error::{CollectionError, Result};
use crate::utils::raw_buf::{
    RawBuf, capacity_overflow, construct_at, destroy_range, grow_capacity, relocate,
};

pub struct Deque<T> {
    buf: RawBuf<T>,
    head: usize,
    len: usize,
}

impl<T> Deque<T> {
    /// Creates an empty deque without allocating.
    pub const fn new() -> Self {
        Self {
            buf: RawBuf::new(),
            head: 0,
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: RawBuf::with_capacity(capacity),
            head: 0,
            len: 0,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Physical slot `add` positions after `index`. Requires `index < capacity` and
    /// `add <= capacity`.
    #[inline(always)]
    fn wrap_add(&self, index: usize, add: usize) -> usize {
        let room = self.capacity() - index;
        if add < room { index + add } else { add - room }
    }

    #[inline(always)]
    fn wrap_sub(&self, index: usize, sub: usize) -> usize {
        if sub <= index {
            index - sub
        } else {
            self.capacity() - (sub - index)
        }
    }

    /// Pointer to the slot holding logical index `index`.
    #[inline(always)]
    fn slot(&self, index: usize) -> *mut T {
        // Safety: `wrap_add` stays below the capacity of the allocation.
        unsafe { self.buf.ptr().add(self.wrap_add(self.head, index)) }
    }

    /// Lengths of the run starting at `head` and of the wrapped run at slot 0.
    #[inline]
    fn segments(&self) -> (usize, usize) {
        let first = self.len.min(self.capacity() - self.head);
        (first, self.len - first)
    }

    /// Ensures room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        let required = match self.len.checked_add(additional) {
            Some(required) => required,
            None => capacity_overflow(),
        };
        if required > self.capacity() {
            self.grow_to(grow_capacity(self.capacity(), required));
        }
    }

    /// Moves the live elements, in logical order, to the front of a fresh buffer.
    #[inline(never)]
    fn grow_to(&mut self, new_capacity: usize) {
        let new_buf = RawBuf::with_capacity(new_capacity);
        let (first, second) = self.segments();
        // Safety: both runs are live, the new buffer holds at least `len` slots and
        // the old buffer is freed without dropping its relocated slots.
        unsafe {
            relocate(self.buf.ptr().add(self.head), new_buf.ptr(), first);
            relocate(self.buf.ptr(), new_buf.ptr().add(first), second);
        }
        self.buf = new_buf;
        self.head = 0;
    }

    pub fn push_back(&mut self, value: T) {
        if self.len == self.capacity() {
            self.reserve(1);
        }
        // Safety: `len < capacity`, so the slot past the back is free.
        unsafe { construct_at(self.slot(self.len), value) };
        self.len += 1;
    }

    pub fn push_front(&mut self, value: T) {
        if self.len == self.capacity() {
            self.reserve(1);
        }
        self.head = self.wrap_sub(self.head, 1);
        // Safety: `len < capacity`, so the slot before the old head is free.
        unsafe { construct_at(self.buf.ptr().add(self.head), value) };
        self.len += 1;
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the deque holds nothing.
    pub fn pop_front(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        // Safety: `head` holds a live value while `len > 0`; it is forgotten below.
        let value = unsafe { ptr::read(self.buf.ptr().add(self.head)) };
        self.head = self.wrap_add(self.head, 1);
        self.len -= 1;
        Ok(value)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the deque holds nothing.
    pub fn pop_back(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        self.len -= 1;
        // Safety: the old back slot is live and now outside the length.
        Ok(unsafe { ptr::read(self.slot(self.len)) })
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        // Safety: logical indices below `len` map to live slots.
        (index < self.len).then(|| unsafe { &*self.slot(index) })
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        // Safety: as in `get`, and `self` is uniquely borrowed.
        (index < self.len).then(|| unsafe { &mut *self.slot(index) })
    }

    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.get(index)
            .ok_or(CollectionError::out_of_range(index, len))
    }

    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.get_mut(index)
            .ok_or(CollectionError::out_of_range(index, len))
    }

    pub fn front(&self) -> Result<&T> {
        self.get(0).ok_or(CollectionError::Empty)
    }

    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.get_mut(0).ok_or(CollectionError::Empty)
    }

    pub fn back(&self) -> Result<&T> {
        let last = self.len.checked_sub(1).ok_or(CollectionError::Empty)?;
        self.get(last).ok_or(CollectionError::Empty)
    }

    pub fn back_mut(&mut self) -> Result<&mut T> {
        let last = self.len.checked_sub(1).ok_or(CollectionError::Empty)?;
        self.get_mut(last).ok_or(CollectionError::Empty)
    }

    /// The elements as two slices, front first. The second is empty unless the
    /// contents wrap around the end of the buffer.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let (first, second) = self.segments();
        // Safety: both runs cover live slots only.
        unsafe {
            (
                slice::from_raw_parts(self.buf.ptr().add(self.head), first),
                slice::from_raw_parts(self.buf.ptr(), second),
            )
        }
    }

    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let (first, second) = self.segments();
        // Safety: the two runs are disjoint and live.
        unsafe {
            (
                slice::from_raw_parts_mut(self.buf.ptr().add(self.head), first),
                slice::from_raw_parts_mut(self.buf.ptr(), second),
            )
        }
    }

    /// Rearranges the storage so the elements form one slice, and returns it.
    pub fn make_contiguous(&mut self) -> &mut [T] {
        if self.segments().1 != 0 {
            self.grow_to(self.capacity());
        }
        self.as_mut_slices().0
    }

    pub fn clear(&mut self) {
        let (first, second) = self.segments();
        let head = self.head;
        self.len = 0;
        self.head = 0;
        // Elements leak rather than double-drop if a destructor panics.
        unsafe {
            destroy_range(self.buf.ptr().add(head), first);
            destroy_range(self.buf.ptr(), second);
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        let (first, second) = self.as_slices();
        Iter {
            inner: first.iter().chain(second.iter()),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (first, second) = self.as_mut_slices();
        IterMut {
            inner: first.iter_mut().chain(second.iter_mut()),
        }
    }
}

impl<T> Drop for Deque<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for Deque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Deque<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for length {}", self.len),
        }
    }
}

impl<T> IndexMut<usize> for Deque<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for length {len}"),
        }
    }
}

impl<T: Clone> Clone for Deque<T> {
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity(self.len);
        for value in self.iter() {
            out.push_back(value.clone());
        }
        out
    }
}

impl<T: fmt::Debug> fmt::Debug for Deque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Deque<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Deque<T> {}

impl<T> Extend<T> for Deque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

pub struct Iter<'a, T> {
    inner: core::iter::Chain<slice::Iter<'a, T>, slice::Iter<'a, T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

pub struct IterMut<'a, T> {
    inner: core::iter::Chain<slice::IterMut<'a, T>, slice::IterMut<'a, T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator returned by [`Deque::into_iter`].
pub struct IntoIter<T> {
    deque: Deque<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.deque.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.deque.len, Some(self.deque.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.deque.pop_back().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for Deque<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { deque: self }
    }
}

impl<'a, T> IntoIterator for &'a Deque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Deque<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_deque_push_pop_both_ends() {
        let mut dq = Deque::new();
        assert_eq!(dq.pop_front(), Err(CollectionError::Empty));
        assert_eq!(dq.pop_back(), Err(CollectionError::Empty));
        dq.push_back(2);
        dq.push_back(3);
        dq.push_front(1);
        dq.push_front(0);
        assert_eq!(dq.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(dq.pop_front(), Ok(0));
        assert_eq!(dq.pop_back(), Ok(3));
        assert_eq!(dq.len(), 2);
        assert_eq!(dq.front(), Ok(&1));
        assert_eq!(dq.back(), Ok(&2));
    }

    #[test]
    fn test_deque_checked_accessors() {
        let mut dq: Deque<i32> = Deque::new();
        assert_eq!(dq.front(), Err(CollectionError::Empty));
        assert_eq!(dq.back_mut(), Err(CollectionError::Empty));
        assert_eq!(dq.at(0), Err(CollectionError::out_of_range(0, 0)));
        dq.extend([10, 20, 30]);
        assert_eq!(dq.at(2), Ok(&30));
        assert_eq!(dq.at(3), Err(CollectionError::out_of_range(3, 3)));
        *dq.at_mut(1).unwrap() += 1;
        *dq.front_mut().unwrap() -= 1;
        dq[2] = 33;
        assert_eq!(dq.iter().copied().collect::<Vec<_>>(), vec![9, 21, 33]);
    }

    #[test]
    #[should_panic(expected = "index 5 out of range for length 2")]
    fn test_deque_index_out_of_range_panics() {
        let dq: Deque<u8> = Deque::from([1, 2]);
        let _ = dq[5];
    }

    #[test]
    fn test_deque_growth_keeps_wrapped_order() {
        let mut dq = Deque::with_capacity(4);
        dq.push_back(3);
        dq.push_back(4);
        dq.push_front(2);
        dq.push_front(1);
        assert_eq!(dq.capacity(), 4);
        let (first, second) = dq.as_slices();
        assert_eq!((first, second), (&[1, 2][..], &[3, 4][..]));

        dq.push_front(0);
        dq.push_back(5);
        assert_eq!(dq.capacity(), 8);
        assert_eq!(dq.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(dq.iter().rev().copied().collect::<Vec<_>>(), vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(dq.iter().len(), 6);
    }

    #[test]
    fn test_deque_make_contiguous() {
        let mut dq = Deque::with_capacity(4);
        dq.extend([2, 3, 4]);
        dq.pop_front().unwrap();
        dq.push_back(5);
        dq.push_back(6);
        assert!(!dq.as_slices().1.is_empty());
        assert_eq!(dq.make_contiguous(), &[3, 4, 5, 6]);
        assert!(dq.as_slices().1.is_empty());
        assert_eq!(dq.capacity(), 4);
    }

    #[test]
    fn test_deque_iter_mut_and_into_iter() {
        let mut dq: Deque<i32> = (1..=5).collect();
        for x in dq.iter_mut() {
            *x *= 10;
        }
        let mut iter = dq.into_iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some(10));
        assert_eq!(iter.next_back(), Some(50));
        assert_eq!(iter.collect::<Vec<_>>(), vec![20, 30, 40]);
    }

    #[test]
    fn test_deque_clone_and_drop_counts() {
        let marker = Rc::new(());
        {
            let mut dq = Deque::with_capacity(2);
            dq.push_front(marker.clone());
            dq.push_front(marker.clone());
            dq.push_back(marker.clone());
            let copy = dq.clone();
            assert_eq!(copy, dq);
            assert_eq!(Rc::strong_count(&marker), 7);
            dq.clear();
            assert!(dq.is_empty());
            assert_eq!(Rc::strong_count(&marker), 4);
            dq.push_back(marker.clone());
            let _partial = dq.into_iter();
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn test_deque_zero_sized_elements() {
        let mut dq: Deque<()> = Deque::new();
        for _ in 0..100 {
            dq.push_front(());
            dq.push_back(());
        }
        assert_eq!(dq.len(), 200);
        assert_eq!(dq.pop_back(), Ok(()));
        assert_eq!(dq.iter().count(), 199);
        assert_eq!(format!("{:?}", Deque::from([(); 2])), "[(), ()]");
    }
}
