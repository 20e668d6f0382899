//! Contiguous vector with inline storage that promotes to the heap.
//!
//! Provides [`SmallVec`], which stores up to `N` elements in a `[MaybeUninit<T>; N]` array
//! embedded in the struct and transparently migrates to a heap buffer once that array
//! is full. Because it `Deref`s to `[T]`, all standard slice methods are available
//! without conversion.
//!
//! [`AnyVec`] is a slice-view trait implemented by `SmallVec`, [`DynArray`], `Vec`,
//! slices (`[T]`) and arrays (`[T; N]`) to enable generic comparison helpers.

use core::borrow::{Borrow, BorrowMut};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::mem::{self, ManuallyDrop, MaybeUninit};
use core::ops::{Deref, DerefMut, Range};
use core::ptr;
use core::slice;

use crate::error::{CollectionError, Result};
use crate::utils::raw_buf::{
    RawBuf, RollbackGuard, capacity_overflow, construct_at, destroy_range, grow_capacity, relocate,
};
use crate::vecs::array::{self, DynArray};

/// A trait generalizing any vector-like contiguous collection.
pub trait AnyVec<T> {
    fn as_slice(&self) -> &[T];

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.as_slice().contains(x)
    }

    fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> AnyVec<T> for Vec<T> {
    fn as_slice(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AnyVec<T> for [T] {
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T, const N: usize> AnyVec<T> for [T; N] {
    fn as_slice(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AnyVec<T> for DynArray<T> {
    fn as_slice(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> AnyVec<T> for SmallVec<T, N> {
    fn as_slice(&self) -> &[T] {
        self.as_slice()
    }
}

/// Storage union. `SmallVec::inline` tells which field is live.
///
/// Both fields are `ManuallyDrop` because the compiler cannot know which one is
/// active; `SmallVec`'s `Drop` releases the right one.
union SmallVecData<T, const N: usize> {
    inline: ManuallyDrop<[MaybeUninit<T>; N]>,
    heap: ManuallyDrop<RawBuf<T>>,
}

/// A vector holding up to `N` elements inline before promoting to the heap.
///
/// # Storage states
/// * **Inline:** elements live in the array embedded in the struct; no allocation.
/// * **Heap:** elements live in a separately allocated buffer.
///
/// Promotion is one-way: once the vector has moved to the heap it stays there even
/// after shrinking, truncating or clearing. Only building a *new* vector (`clone`,
/// `collect`, `with_capacity`) starts over with inline storage.
///
/// The element pointer is recomputed from the storage tag on every access, so the
/// struct is never self-referential and moving a `SmallVec` (inline or not) is a plain
/// bitwise copy.
pub struct SmallVec<T, const N: usize> {
    len: usize,
    inline: bool,
    data: SmallVecData<T, N>,
}

impl<T, const N: usize> SmallVec<T, N> {
    /// Largest permitted `size_of::<SmallVec<T, N>>()` in bytes (16 KiB).
    ///
    /// Inline storage lives wherever the vector lives, typically the stack, so an
    /// oversized `N` is rejected at compile time.
    pub const MAX_INLINE_SIZE: usize = 16 * 1024;

    /// Creates an empty vector using inline storage.
    ///
    /// With `N == 0` there is no inline storage; the vector starts heap-backed with
    /// zero capacity and allocates on the first push.
    pub fn new() -> Self {
        const {
            assert!(
                mem::size_of::<Self>() <= SmallVec::<T, N>::MAX_INLINE_SIZE,
                "SmallVec is too large! Reduce N or box the element type."
            );
        }
        if N == 0 {
            Self {
                len: 0,
                inline: false,
                data: SmallVecData {
                    heap: ManuallyDrop::new(RawBuf::new()),
                },
            }
        } else {
            Self {
                len: 0,
                inline: true,
                data: SmallVecData {
                    inline: ManuallyDrop::new([const { MaybeUninit::uninit() }; N]),
                },
            }
        }
    }

    /// Creates an empty vector able to hold `capacity` elements without reallocating.
    ///
    /// Stays inline when `capacity <= N`.
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity <= N {
            Self::new()
        } else {
            Self {
                len: 0,
                inline: false,
                data: SmallVecData {
                    heap: ManuallyDrop::new(RawBuf::with_capacity(capacity)),
                },
            }
        }
    }

    /// Returns `true` while the elements live in the embedded array.
    #[inline(always)]
    pub fn using_inline_storage(&self) -> bool {
        self.inline
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
        if self.inline {
            N
        } else {
            unsafe { self.data.heap.capacity() }
        }
    }

    #[inline(always)]
    fn data_ptr(&self) -> *const T {
        unsafe {
            if self.inline {
                (*self.data.inline).as_ptr() as *const T
            } else {
                self.data.heap.ptr()
            }
        }
    }

    #[inline(always)]
    fn data_mut_ptr(&mut self) -> *mut T {
        unsafe {
            if self.inline {
                (*self.data.inline).as_mut_ptr() as *mut T
            } else {
                self.data.heap.ptr()
            }
        }
    }

    /// Replaces the active storage with `buf`, freeing the previous heap buffer.
    ///
    /// # Safety
    /// The live elements must already have been relocated into `buf`.
    unsafe fn install_heap(&mut self, buf: RawBuf<T>) {
        unsafe {
            if self.inline {
                log::trace!(
                    "SmallVec<_, {}> promoted to heap: len={}, capacity={}",
                    N,
                    self.len,
                    buf.capacity()
                );
                self.inline = false;
            } else {
                ManuallyDrop::drop(&mut self.data.heap);
            }
            self.data.heap = ManuallyDrop::new(buf);
        }
    }

    /// Moves every element into a fresh heap buffer of `new_capacity` slots.
    #[inline(never)]
    fn grow_to(&mut self, new_capacity: usize) {
        let buf = RawBuf::with_capacity(new_capacity);
        unsafe {
            relocate(self.data_ptr(), buf.ptr(), self.len);
            self.install_heap(buf);
        }
    }

    #[inline]
    fn required(&self, additional: usize) -> usize {
        match self.len.checked_add(additional) {
            Some(required) => required,
            None => capacity_overflow(),
        }
    }

    /// Ensures room for `additional` more elements, promoting to the heap if needed.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.required(additional);
        if required > self.capacity() {
            self.grow_to(grow_capacity(self.capacity(), required));
        }
    }

    /// Appends an element, growing to `max(capacity * 2, len + 1)` when full.
    #[inline(always)]
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow_to(grow_capacity(self.capacity(), self.required(1)));
        }
        unsafe { construct_at(self.data_mut_ptr().add(self.len), value) };
        self.len += 1;
    }

    /// Removes the last element, or `None` if empty.
    #[inline(always)]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { ptr::read(self.data_ptr().add(self.len)) })
    }

    /// Removes the last element.
    ///
    /// # Errors
    /// [`CollectionError::Empty`] if the vector holds no elements.
    pub fn pop_back(&mut self) -> Result<T> {
        self.pop().ok_or(CollectionError::Empty)
    }

    /// Inserts `value` at `index`.
    ///
    /// With spare capacity the tail is shifted in place. When full, the elements are
    /// relocated into a new heap buffer with the gap already opened, so each element
    /// moves exactly once.
    ///
    /// # Errors
    /// [`CollectionError::InvalidArgument`] if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(CollectionError::invalid_argument(index, self.len));
        }
        if self.len < self.capacity() {
            unsafe {
                let p = self.data_mut_ptr().add(index);
                ptr::copy(p, p.add(1), self.len - index);
                construct_at(p, value);
            }
        } else {
            self.grow_for_insert(index, value);
        }
        self.len += 1;
        Ok(())
    }

    #[inline(never)]
    fn grow_for_insert(&mut self, index: usize, value: T) {
        let buf = RawBuf::with_capacity(grow_capacity(self.capacity(), self.required(1)));
        unsafe {
            let src = self.data_ptr();
            let dst = buf.ptr();
            relocate(src, dst, index);
            construct_at(dst.add(index), value);
            relocate(src.add(index), dst.add(index + 1), self.len - index);
            self.install_heap(buf);
        }
    }

    /// Removes and returns the element at `index`, shifting the tail down.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(CollectionError::out_of_range(index, self.len));
        }
        unsafe {
            let p = self.data_mut_ptr().add(index);
            let value = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - index - 1);
            self.len -= 1;
            Ok(value)
        }
    }

    /// Removes the element at `index` by moving the last element into its place.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(CollectionError::out_of_range(index, self.len));
        }
        unsafe {
            let base = self.data_mut_ptr();
            let value = ptr::read(base.add(index));
            self.len -= 1;
            if index != self.len {
                ptr::copy_nonoverlapping(base.add(self.len), base.add(index), 1);
            }
            Ok(value)
        }
    }

    /// Drops the elements in `range` and shifts the tail down.
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
        self.len = start;
        unsafe {
            let base = self.data_mut_ptr();
            destroy_range(base.add(start), end - start);
            ptr::copy(base.add(end), base.add(start), tail);
        }
        self.len = start + tail;
        Ok(start)
    }

    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            let old_len = self.len;
            self.len = len;
            unsafe { destroy_range(self.data_mut_ptr().add(len), old_len - len) };
        }
    }

    /// Drops every element. Heap storage is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        let len = self.len;
        self.len = 0;
        let mut kept = 0;
        unsafe {
            let base = self.data_mut_ptr();
            for i in 0..len {
                let cur = base.add(i);
                if f(&*cur) {
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

    /// Shrinks a heap buffer down to the length. Never moves back to inline storage.
    pub fn shrink_to_fit(&mut self) {
        if !self.inline && self.capacity() > self.len {
            self.grow_to(self.len);
        }
    }

    /// Exchanges the contents of two vectors.
    ///
    /// When both sides are heap-backed this only exchanges buffer handles. Inline
    /// storage cannot be handed over by pointer, so any inline side has its embedded
    /// array moved bitwise into the other struct.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Converts into a [`DynArray`], reusing the heap buffer when there is one.
    pub fn into_dyn_array(self) -> DynArray<T> {
        let this = ManuallyDrop::new(self);
        unsafe {
            if this.inline {
                let buf = RawBuf::with_capacity(this.len);
                relocate(this.data_ptr(), buf.ptr(), this.len);
                DynArray::from_raw_parts(buf, this.len)
            } else {
                DynArray::from_raw_parts(ptr::read(&*this.data.heap), this.len)
            }
        }
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline(always)]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.get(index)
            .ok_or(CollectionError::out_of_range(index, self.len))
    }

    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.get_mut(index)
            .ok_or(CollectionError::out_of_range(index, len))
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the vector holds no elements.
    pub fn front(&self) -> Result<&T> {
        self.as_slice().first().ok_or(CollectionError::Empty)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the vector holds no elements.
    pub fn back(&self) -> Result<&T> {
        self.as_slice().last().ok_or(CollectionError::Empty)
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.data_ptr(), self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len;
        unsafe { slice::from_raw_parts_mut(self.data_mut_ptr(), len) }
    }
}

impl<T: Clone, const N: usize> SmallVec<T, N> {
    /// Appends clones of `other`; a panicking `clone` leaves the vector unchanged.
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.reserve(other.len());
        let added = unsafe {
            let mut guard = RollbackGuard::new(self.data_mut_ptr().add(self.len), other.len());
            for item in other {
                guard.push(item.clone());
            }
            guard.commit()
        };
        self.len += added;
    }

    pub fn resize(&mut self, new_len: usize, value: T) {
        if new_len > self.len {
            let extra = new_len - self.len;
            self.reserve(extra);
            let added = unsafe {
                let mut guard = RollbackGuard::new(self.data_mut_ptr().add(self.len), extra);
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

impl<T, const N: usize> Deref for SmallVec<T, N> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for SmallVec<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> Drop for SmallVec<T, N> {
    fn drop(&mut self) {
        unsafe {
            destroy_range(self.data_mut_ptr(), self.len);
            if !self.inline {
                ManuallyDrop::drop(&mut self.data.heap);
            }
        }
    }
}

impl<T: Clone, const N: usize> Clone for SmallVec<T, N> {
    /// Deep copy into fresh storage sized by the source length, so a heap-backed
    /// source whose elements fit in `N` yields an inline clone.
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity(self.len);
        out.len = unsafe {
            let mut guard = RollbackGuard::new(out.data_mut_ptr(), self.len);
            for item in self.as_slice() {
                guard.push(item.clone());
            }
            guard.commit()
        };
        out
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for SmallVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T, const N: usize> Default for SmallVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq, const N: usize, const M: usize> PartialEq<SmallVec<T, M>> for SmallVec<T, N> {
    fn eq(&self, other: &SmallVec<T, M>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize> Eq for SmallVec<T, N> {}

impl<T: Hash, const N: usize> Hash for SmallVec<T, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: PartialOrd, const N: usize> PartialOrd for SmallVec<T, N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, const N: usize> Ord for SmallVec<T, N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T, const N: usize> Extend<T> for SmallVec<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<T, const N: usize> FromIterator<T> for SmallVec<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = SmallVec::new();
        vec.extend(iter);
        vec
    }
}

impl<T, const N: usize> AsRef<[T]> for SmallVec<T, N> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> AsMut<[T]> for SmallVec<T, N> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> Borrow<[T]> for SmallVec<T, N> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> BorrowMut<[T]> for SmallVec<T, N> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

/// Owning iterator returned by [`SmallVec::into_iter`].
pub struct IntoIter<T, const N: usize> {
    iter: IntoIterState<T, N>,
}

enum IntoIterState<T, const N: usize> {
    Inline {
        data: [MaybeUninit<T>; N],
        pos: usize,
        end: usize,
    },
    Heap(array::IntoIter<T>),
}

impl<T, const N: usize> IntoIterator for SmallVec<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        if self.inline {
            let this = ManuallyDrop::new(self);
            IntoIter {
                iter: IntoIterState::Inline {
                    data: unsafe { ptr::read(&*this.data.inline) },
                    pos: 0,
                    end: this.len,
                },
            }
        } else {
            IntoIter {
                iter: IntoIterState::Heap(self.into_dyn_array().into_iter()),
            }
        }
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a SmallVec<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut SmallVec<T, N> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.iter {
            IntoIterState::Inline { data, pos, end } => {
                if *pos < *end {
                    let value = unsafe { data[*pos].assume_init_read() };
                    *pos += 1;
                    Some(value)
                } else {
                    None
                }
            }
            IntoIterState::Heap(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.iter {
            IntoIterState::Inline { pos, end, .. } => {
                let remaining = end - pos;
                (remaining, Some(remaining))
            }
            IntoIterState::Heap(iter) => iter.size_hint(),
        }
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match &mut self.iter {
            IntoIterState::Inline { data, pos, end } => {
                if *pos < *end {
                    *end -= 1;
                    Some(unsafe { data[*end].assume_init_read() })
                } else {
                    None
                }
            }
            IntoIterState::Heap(iter) => iter.next_back(),
        }
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}
impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    fn drop(&mut self) {
        if let IntoIterState::Inline { data, pos, end } = &mut self.iter {
            for slot in &mut data[*pos..*end] {
                unsafe { slot.assume_init_drop() };
            }
        }
    }
}

impl<T, const N: usize> SmallVec<T, N> {
    pub fn eq_any<V: AnyVec<T> + ?Sized>(&self, other: &V) -> bool
    where
        T: PartialEq,
    {
        self.as_slice() == other.as_slice()
    }

    pub fn cmp_any<V: AnyVec<T> + ?Sized>(&self, other: &V) -> Ordering
    where
        T: Ord,
    {
        self.as_slice().cmp(other.as_slice())
    }

    pub fn starts_with_any<V: AnyVec<T> + ?Sized>(&self, other: &V) -> bool
    where
        T: PartialEq,
    {
        self.as_slice().starts_with(other.as_slice())
    }

    pub fn contains_subsequence<V: AnyVec<T> + ?Sized>(&self, other: &V) -> bool
    where
        T: PartialEq,
    {
        let needle = other.as_slice();
        if needle.is_empty() {
            return true;
        }
        needle.len() <= self.len && self.as_slice().windows(needle.len()).any(|w| w == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    struct Dropper(Rc<Cell<usize>>);
    impl Drop for Dropper {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_small_vec_inline_growth_and_accessors() {
        let mut xs: SmallVec<i32, 4> = SmallVec::new();
        assert!(xs.is_empty());
        assert!(xs.using_inline_storage());
        assert_eq!(xs.capacity(), 4);
        for i in 0..4 {
            xs.push(i);
        }
        assert!(xs.using_inline_storage());
        assert_eq!(xs.front(), Ok(&0));
        assert_eq!(xs.back(), Ok(&3));

        xs.push(4);
        assert!(!xs.using_inline_storage());
        assert!(xs.capacity() >= 5);
        assert_eq!(xs[4], 4);
        assert_eq!(xs.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_small_vec_promotion_is_permanent() {
        let mut xs: SmallVec<i32, 2> = SmallVec::from_iter([1, 2, 3]);
        assert!(!xs.using_inline_storage());
        xs.truncate(1);
        xs.shrink_to_fit();
        assert!(!xs.using_inline_storage());
        xs.clear();
        assert!(!xs.using_inline_storage());
        assert_eq!(xs.capacity(), 1);
    }

    #[test]
    fn test_small_vec_insert_remove() {
        let mut xs: SmallVec<i32, 4> = SmallVec::from_iter([1, 3, 4]);
        xs.insert(1, 2).unwrap();
        assert_eq!(xs.as_slice(), &[1, 2, 3, 4]);
        assert!(xs.using_inline_storage());
        assert_eq!(xs.erase(2..3), Ok(2));
        assert_eq!(xs[2], 4);
        assert_eq!(xs.erase(0..xs.len()), Ok(0));
        assert!(xs.is_empty());
        assert_eq!(xs.insert(1, 9), Err(CollectionError::invalid_argument(1, 0)));
        assert_eq!(xs.remove(0), Err(CollectionError::out_of_range(0, 0)));
    }

    #[test]
    fn test_small_vec_insert_when_full_relocates() {
        let mut xs: SmallVec<String, 2> = SmallVec::new();
        xs.push("a".to_string());
        xs.push("c".to_string());
        xs.insert(1, "b".to_string()).unwrap();
        assert!(!xs.using_inline_storage());
        assert_eq!(xs.as_slice(), &["a", "b", "c"]);
        xs.insert(0, "_".to_string()).unwrap();
        xs.insert(4, "d".to_string()).unwrap();
        assert_eq!(xs.as_slice(), &["_", "a", "b", "c", "d"]);
    }

    #[test]
    fn test_small_vec_swap_remove_and_retain() {
        let mut xs: SmallVec<i32, 8> = SmallVec::from_iter(0..6);
        assert_eq!(xs.swap_remove(0), Ok(0));
        assert_eq!(xs.as_slice(), &[5, 1, 2, 3, 4]);
        xs.retain(|x| x % 2 == 1);
        assert_eq!(xs.as_slice(), &[5, 1, 3]);
    }

    #[test]
    fn test_small_vec_pop_and_errors() {
        let mut xs: SmallVec<i32, 2> = SmallVec::new();
        assert_eq!(xs.pop(), None);
        assert_eq!(xs.pop_back(), Err(CollectionError::Empty));
        assert_eq!(xs.front(), Err(CollectionError::Empty));
        assert_eq!(xs.at(0), Err(CollectionError::out_of_range(0, 0)));
        xs.push(7);
        assert_eq!(xs.pop_back(), Ok(7));
    }

    #[test]
    fn test_small_vec_zero_inline_capacity() {
        let mut xs: SmallVec<u8, 0> = SmallVec::new();
        assert!(!xs.using_inline_storage());
        assert_eq!(xs.capacity(), 0);
        xs.push(1);
        xs.push(2);
        assert_eq!(xs.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_small_vec_clone_heap_source_comes_back_inline() {
        let mut xs: SmallVec<String, 4> = SmallVec::new();
        for s in ["a", "b", "c", "d", "e"] {
            xs.push(s.to_string());
        }
        xs.truncate(3);
        assert!(!xs.using_inline_storage());
        let mut ys = xs.clone();
        assert!(ys.using_inline_storage());
        assert_eq!(xs, ys);
        ys[0].push('!');
        assert_eq!(xs[0], "a");
    }

    #[test]
    fn test_small_vec_move_keeps_contents() {
        let xs: SmallVec<String, 4> = SmallVec::from_iter(["a", "b", "c"].map(String::from));
        let boxed = Box::new(xs);
        let zs = *boxed;
        assert!(zs.using_inline_storage());
        assert_eq!(zs.as_slice(), &["a", "b", "c"]);
    }

    #[test]
    fn test_small_vec_swap_mixed_storage() {
        let mut inline: SmallVec<i32, 2> = SmallVec::from_iter([1]);
        let mut heap: SmallVec<i32, 2> = SmallVec::from_iter([7, 8, 9]);
        inline.swap(&mut heap);
        assert_eq!(inline.as_slice(), &[7, 8, 9]);
        assert!(!inline.using_inline_storage());
        assert_eq!(heap.as_slice(), &[1]);
        assert!(heap.using_inline_storage());
    }

    #[test]
    fn test_small_vec_into_iter_both_storages() {
        let xs: SmallVec<i32, 4> = SmallVec::from_iter([1, 2, 3]);
        let collected: Vec<i32> = xs.into_iter().rev().collect();
        assert_eq!(collected, vec![3, 2, 1]);
        let ys: SmallVec<i32, 2> = SmallVec::from_iter([1, 2, 3]);
        assert_eq!(ys.into_iter().map(|x| x * 2).collect::<Vec<_>>(), vec![2, 4, 6]);
    }

    #[test]
    fn test_small_vec_drop_counts() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut xs: SmallVec<Dropper, 2> = SmallVec::new();
            xs.push(Dropper(drops.clone()));
            xs.push(Dropper(drops.clone()));
        }
        assert_eq!(drops.get(), 2);
        drops.set(0);
        {
            let mut xs: SmallVec<Dropper, 2> = SmallVec::new();
            for _ in 0..3 {
                xs.push(Dropper(drops.clone()));
            }
            let mut iter = xs.into_iter();
            drop(iter.next());
        }
        assert_eq!(drops.get(), 3);
        drops.set(0);
        {
            let mut xs: SmallVec<Dropper, 4> = SmallVec::new();
            for _ in 0..3 {
                xs.push(Dropper(drops.clone()));
            }
            let mut iter = xs.into_iter();
            drop(iter.next_back());
        }
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn test_small_vec_clone_panic_drops_prefix() {
        struct Bomb(Rc<Cell<usize>>, bool);
        impl Clone for Bomb {
            fn clone(&self) -> Self {
                assert!(!self.1, "clone failed");
                Bomb(self.0.clone(), false)
            }
        }
        impl Drop for Bomb {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }
        let drops = Rc::new(Cell::new(0));
        let mut xs: SmallVec<Bomb, 4> = SmallVec::new();
        xs.push(Bomb(drops.clone(), false));
        xs.push(Bomb(drops.clone(), true));
        let result = catch_unwind(AssertUnwindSafe(|| xs.clone()));
        assert!(result.is_err());
        assert_eq!(drops.get(), 1);
        assert_eq!(xs.len(), 2);
    }

    #[test]
    fn test_small_vec_resize_and_extend() {
        let mut v: SmallVec<i32, 4> = SmallVec::new();
        v.resize(2, 0);
        assert!(v.using_inline_storage());
        v.extend_from_slice(&[1, 2]);
        assert!(v.using_inline_storage());
        v.resize(10, 5);
        assert!(!v.using_inline_storage());
        assert_eq!(v.len(), 10);
        assert_eq!(v[9], 5);
    }

    #[test]
    fn test_small_vec_into_dyn_array() {
        let inline: SmallVec<i32, 4> = SmallVec::from_iter([1, 2]);
        assert_eq!(inline.into_dyn_array().as_slice(), &[1, 2]);
        let heap: SmallVec<i32, 1> = SmallVec::from_iter([1, 2, 3]);
        assert_eq!(heap.into_dyn_array().as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_small_vec_any_vec_interop() {
        let sv: SmallVec<i32, 8> = SmallVec::from_iter([1, 2, 3, 4, 5]);
        let arr: DynArray<i32> = DynArray::from([1, 2, 3, 4, 5]);
        assert!(sv.eq_any(&arr));
        assert_eq!(sv.cmp_any(&vec![1, 2, 4]), Ordering::Less);
        assert!(sv.starts_with_any(&[1, 2]));
        assert!(sv.contains_subsequence(&vec![3, 4]));
        assert!(!sv.contains_subsequence(&[3, 5]));
    }
}
