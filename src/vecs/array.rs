//! Contiguous growable array built directly on the allocation primitives.
//!
//! [`DynArray`] is the workhorse storage of the crate: hash buckets, tree slabs,
//! stable-vector slots, heaps, flat containers and the stack adapter all sit on top
//! of it. It `Deref`s to `[T]`, so every slice method is available without
//! conversion.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut, Range};
use core::ptr;
use core::slice;

use crate::error::{CollectionError, Result};
use crate::utils::raw_buf::{
    RawBuf, RollbackGuard, capacity_overflow, construct_at, destroy_range, grow_capacity, relocate,
};

/// A contiguous, heap-allocated, growable array.
///
/// # Growth
/// Capacity at least doubles whenever a push finds the buffer full, giving amortized
/// O(1) appends. Reallocation relocates elements bitwise into the new buffer and then
/// frees the old one, so it either fully succeeds or (on allocation failure) aborts
/// without touching the elements.
pub struct DynArray<T> {
    buf: RawBuf<T>,
    len: usize,
}

impl<T> DynArray<T> {
    /// Creates an empty array without allocating.
    pub const fn new() -> Self {
        Self {
            buf: RawBuf::new(),
            len: 0,
        }
    }

    /// Creates an empty array with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: RawBuf::with_capacity(capacity),
            len: 0,
        }
    }

    /// Adopts a buffer whose first `len` slots are initialized.
    ///
    /// # Safety
    /// `len <= buf.capacity()` and slots `0..len` must hold live values.
    pub(crate) unsafe fn from_raw_parts(buf: RawBuf<T>, len: usize) -> Self {
        Self { buf, len }
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

    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        // Safety: the first `len` slots are initialized.
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // Safety: the first `len` slots are initialized and uniquely borrowed.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Ensures room for at least `additional` more elements, growing geometrically.
    pub fn reserve(&mut self, additional: usize) {
        let required = match self.len.checked_add(additional) {
            Some(required) => required,
            None => capacity_overflow(),
        };
        if required > self.capacity() {
            self.grow_to(grow_capacity(self.capacity(), required));
        }
    }

    /// Ensures room for exactly `additional` more elements.
    pub fn reserve_exact(&mut self, additional: usize) {
        let required = match self.len.checked_add(additional) {
            Some(required) => required,
            None => capacity_overflow(),
        };
        if required > self.capacity() {
            self.grow_to(required);
        }
    }

    #[inline(never)]
    fn grow_to(&mut self, new_capacity: usize) {
        let new_buf = RawBuf::with_capacity(new_capacity);
        // Safety: both buffers hold at least `len` slots; the old slots become
        // logically uninitialized and the old buffer is freed without dropping them.
        unsafe { relocate(self.buf.ptr(), new_buf.ptr(), self.len) };
        self.buf = new_buf;
    }

    /// Shrinks the capacity down to the length.
    pub fn shrink_to_fit(&mut self) {
        if self.capacity() > self.len {
            self.grow_to(self.len);
        }
    }

    /// Appends an element.
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.reserve(1);
        }
        // Safety: `len < capacity` after the reserve.
        unsafe { construct_at(self.buf.ptr().add(self.len), value) };
        self.len += 1;
    }

    /// Removes the last element, or `None` if empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // Safety: slot `len` was initialized and is now outside the live range.
        Some(unsafe { ptr::read(self.buf.ptr().add(self.len)) })
    }

    /// Removes the last element.
    ///
    /// # Errors
    /// [`CollectionError::Empty`] if the array holds no elements.
    pub fn pop_back(&mut self) -> Result<T> {
        self.pop().ok_or(CollectionError::Empty)
    }

    /// Inserts `value` at `index`, shifting the tail one slot to the right.
    ///
    /// # Errors
    /// [`CollectionError::InvalidArgument`] if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(CollectionError::invalid_argument(index, self.len));
        }
        if self.len == self.capacity() {
            self.reserve(1);
        }
        unsafe {
            let p = self.buf.ptr().add(index);
            ptr::copy(p, p.add(1), self.len - index);
            construct_at(p, value);
        }
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting the tail left.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(CollectionError::out_of_range(index, self.len));
        }
        unsafe {
            let p = self.buf.ptr().add(index);
            let value = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - index - 1);
            self.len -= 1;
            Ok(value)
        }
    }

    /// Removes the element at `index` by moving the last element into its slot.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(CollectionError::out_of_range(index, self.len));
        }
        unsafe {
            let base = self.buf.ptr();
            let value = ptr::read(base.add(index));
            self.len -= 1;
            if index != self.len {
                ptr::copy_nonoverlapping(base.add(self.len), base.add(index), 1);
            }
            Ok(value)
        }
    }

    /// Drops the elements in `range` and closes the gap.
    ///
    /// Returns the index of the element that followed the erased range.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if the range is reversed or extends past `len`.
    pub fn erase(&mut self, range: Range<usize>) -> Result<usize> {
        let Range { start, end } = range;
        if start > end || end > self.len {
            return Err(CollectionError::out_of_range(end.max(start), self.len));
        }
        let tail = self.len - end;
        // Elements past `start` leak rather than double-drop if a destructor panics.
        self.len = start;
        unsafe {
            let base = self.buf.ptr();
            destroy_range(base.add(start), end - start);
            ptr::copy(base.add(end), base.add(start), tail);
        }
        self.len = start + tail;
        Ok(start)
    }

    /// Shortens the array to `len`, dropping the excess elements.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            let old_len = self.len;
            self.len = len;
            unsafe { destroy_range(self.buf.ptr().add(len), old_len - len) };
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes in place, filling new slots with values produced by `f`.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        if new_len > self.len {
            self.reserve(new_len - self.len);
            while self.len < new_len {
                self.push(f());
            }
        } else {
            self.truncate(new_len);
        }
    }

    /// Keeps only the elements for which `f` returns `true`, preserving order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.retain_mut(|value| f(&*value));
    }

    pub fn retain_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        let len = self.len;
        // A panicking predicate leaks the elements instead of double-dropping them.
        self.len = 0;
        let mut kept = 0;
        unsafe {
            let base = self.buf.ptr();
            for i in 0..len {
                let cur = base.add(i);
                if f(&mut *cur) {
                    if kept != i {
                        ptr::copy_nonoverlapping(cur, base.add(kept), 1);
                    }
                    kept += 1;
                } else {
                    ptr::drop_in_place(cur);
                }
            }
        }
        self.len = kept;
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline(always)]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Bounds-checked access.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.get(index)
            .ok_or(CollectionError::out_of_range(index, len))
    }

    /// Bounds-checked mutable access.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.get_mut(index)
            .ok_or(CollectionError::out_of_range(index, len))
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the array holds no elements.
    pub fn front(&self) -> Result<&T> {
        self.as_slice().first().ok_or(CollectionError::Empty)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the array holds no elements.
    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice().first_mut().ok_or(CollectionError::Empty)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the array holds no elements.
    pub fn back(&self) -> Result<&T> {
        self.as_slice().last().ok_or(CollectionError::Empty)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the array holds no elements.
    pub fn back_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice().last_mut().ok_or(CollectionError::Empty)
    }
}

impl<T: Clone> DynArray<T> {
    /// Appends clones of every element of `other`.
    ///
    /// If a `clone` panics, the clones made so far are dropped and the array keeps
    /// its previous contents.
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.reserve(other.len());
        let added = unsafe {
            let mut guard = RollbackGuard::new(self.buf.ptr().add(self.len), other.len());
            for item in other {
                guard.push(item.clone());
            }
            guard.commit()
        };
        self.len += added;
    }

    /// Resizes in place, filling new slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T) {
        if new_len > self.len {
            let extra = new_len - self.len;
            self.reserve(extra);
            let added = unsafe {
                let mut guard = RollbackGuard::new(self.buf.ptr().add(self.len), extra);
                for _ in 1..extra {
                    guard.push(value.clone());
                }
                guard.push(value);
                guard.commit()
            };
            self.len += added;
        } else {
            self.truncate(new_len);
        }
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        // Safety: exactly `len` slots are initialized; `buf` frees the memory afterwards.
        unsafe { destroy_range(self.buf.ptr(), self.len) }
    }
}

impl<T: Clone> Clone for DynArray<T> {
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity(self.len);
        out.len = unsafe {
            let mut guard = RollbackGuard::new(out.buf.ptr(), self.len);
            for item in self.as_slice() {
                guard.push(item.clone());
            }
            guard.commit()
        };
        out
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];
    #[inline(always)]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<T: PartialOrd> PartialOrd for DynArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for DynArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for DynArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> Extend<T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

/// Owning iterator returned by [`DynArray::into_iter`].
pub struct IntoIter<T> {
    buf: RawBuf<T>,
    start: usize,
    end: usize,
    _marker: PhantomData<T>,
}

impl<T> IntoIter<T> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.ptr().add(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let value = unsafe { ptr::read(self.buf.ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { ptr::read(self.buf.ptr().add(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        unsafe { destroy_range(self.buf.ptr().add(self.start), self.end - self.start) }
    }
}

impl<T> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let mut this = core::mem::ManuallyDrop::new(self);
        let buf = core::mem::replace(&mut this.buf, RawBuf::new());
        IntoIter {
            buf,
            start: 0,
            end: this.len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    #[test]
    fn test_array_push_pop_growth() {
        let mut arr: DynArray<i32> = DynArray::new();
        assert_eq!(arr.capacity(), 0);
        for i in 0..10 {
            arr.push(i);
        }
        assert_eq!(arr.len(), 10);
        assert!(arr.capacity() >= 10);
        assert_eq!(arr.pop(), Some(9));
        assert_eq!(arr.pop_back(), Ok(8));
        assert_eq!(arr.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_array_checked_accessors() {
        let mut arr: DynArray<i32> = DynArray::new();
        assert_eq!(arr.front(), Err(CollectionError::Empty));
        assert_eq!(arr.back(), Err(CollectionError::Empty));
        assert_eq!(arr.pop_back(), Err(CollectionError::Empty));
        arr.push(4);
        arr.push(5);
        assert_eq!(arr.front(), Ok(&4));
        assert_eq!(arr.back(), Ok(&5));
        assert_eq!(arr.at(1), Ok(&5));
        assert_eq!(arr.at(2), Err(CollectionError::out_of_range(2, 2)));
        *arr.at_mut(0).unwrap() = 40;
        assert_eq!(arr[0], 40);
    }

    #[test]
    fn test_array_insert_remove() {
        let mut arr = DynArray::from([1, 3, 4]);
        arr.insert(1, 2).unwrap();
        assert_eq!(arr.as_slice(), &[1, 2, 3, 4]);
        arr.insert(4, 5).unwrap();
        assert_eq!(
            arr.insert(9, 0),
            Err(CollectionError::invalid_argument(9, 5))
        );
        assert_eq!(arr.remove(0), Ok(1));
        assert_eq!(arr.remove(10), Err(CollectionError::out_of_range(10, 4)));
        assert_eq!(arr.swap_remove(0), Ok(2));
        assert_eq!(arr.as_slice(), &[5, 3, 4]);
    }

    #[test]
    fn test_array_erase_range() {
        let mut arr: DynArray<String> = (0..6).map(|i| i.to_string()).collect();
        assert_eq!(arr.erase(1..4), Ok(1));
        assert_eq!(arr.as_slice(), &["0", "4", "5"]);
        assert_eq!(arr.erase(2..5), Err(CollectionError::out_of_range(5, 3)));
        assert_eq!(arr.erase(3..3), Ok(3));
        assert_eq!(arr.len(), 3);
    }

    #[test]
    fn test_array_retain_truncate_resize() {
        let mut arr: DynArray<i32> = (0..10).collect();
        arr.retain(|x| x % 3 == 0);
        assert_eq!(arr.as_slice(), &[0, 3, 6, 9]);
        arr.truncate(2);
        assert_eq!(arr.as_slice(), &[0, 3]);
        arr.resize(4, 7);
        assert_eq!(arr.as_slice(), &[0, 3, 7, 7]);
        let mut n = 0;
        arr.resize_with(6, || {
            n += 1;
            n
        });
        assert_eq!(arr.as_slice(), &[0, 3, 7, 7, 1, 2]);
        arr.shrink_to_fit();
        assert_eq!(arr.capacity(), 6);
    }

    #[test]
    fn test_array_into_iter_both_ends() {
        let arr: DynArray<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let mut iter = arr.into_iter();
        assert_eq!(iter.next().as_deref(), Some("a"));
        assert_eq!(iter.next_back().as_deref(), Some("d"));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.as_slice(), &["b", "c"]);
    }

    #[test]
    fn test_array_clone_is_independent() {
        let a: DynArray<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let mut b = a.clone();
        b[0].push('!');
        b.push("z".to_string());
        assert_eq!(a.as_slice(), &["x", "y"]);
        assert_eq!(b.as_slice(), &["x!", "y", "z"]);
    }

    #[test]
    fn test_array_extend_from_slice_rolls_back_on_panic() {
        struct Bomb {
            drops: Rc<Cell<usize>>,
            explode: bool,
        }
        impl Clone for Bomb {
            fn clone(&self) -> Self {
                if self.explode {
                    panic!("clone failed");
                }
                Bomb {
                    drops: self.drops.clone(),
                    explode: false,
                }
            }
        }
        impl Drop for Bomb {
            fn drop(&mut self) {
                self.drops.set(self.drops.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let source = vec![
            Bomb { drops: drops.clone(), explode: false },
            Bomb { drops: drops.clone(), explode: false },
            Bomb { drops: drops.clone(), explode: true },
        ];
        let mut arr: DynArray<Bomb> = DynArray::new();
        let result = catch_unwind(AssertUnwindSafe(|| arr.extend_from_slice(&source)));
        assert!(result.is_err());
        assert_eq!(arr.len(), 0);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_array_drop_counts() {
        let drops = Rc::new(Cell::new(0));
        struct Dropper(Rc<Cell<usize>>);
        impl Drop for Dropper {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }
        {
            let mut arr = DynArray::new();
            for _ in 0..5 {
                arr.push(Dropper(drops.clone()));
            }
            let mut iter = arr.into_iter();
            drop(iter.next());
        }
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn test_array_zero_sized_elements() {
        let mut arr: DynArray<()> = DynArray::new();
        for _ in 0..1000 {
            arr.push(());
        }
        assert_eq!(arr.len(), 1000);
        assert_eq!(arr.into_iter().count(), 1000);
    }
}
