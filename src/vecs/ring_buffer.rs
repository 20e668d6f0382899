//! Fixed-capacity FIFO ring buffer stored inline.
//!
//! [`RingBuffer`] never allocates. Once `N` elements are held, every further push
//! overwrites (and hands back) the oldest element.

use core::fmt;
use core::iter::FusedIterator;
use core::mem::MaybeUninit;

use crate::error::{CollectionError, Result};

/// A ring of `N` inline slots addressed by a `head` cursor and a length.
pub struct RingBuffer<T, const N: usize> {
    data: [MaybeUninit<T>; N],
    head: usize,
    len: usize,
}

impl<T, const N: usize> RingBuffer<T, N> {
    pub fn new() -> Self {
        const { assert!(N > 0, "RingBuffer capacity must be > 0") };
        Self {
            data: [const { MaybeUninit::uninit() }; N],
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
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline(always)]
    fn wrap_add(&self, idx: usize, add: usize) -> usize {
        (idx + add) % N
    }

    /// Appends `value` at the tail.
    ///
    /// When the buffer is full the oldest element is evicted and returned.
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.len < N {
            let tail = self.wrap_add(self.head, self.len);
            self.data[tail].write(value);
            self.len += 1;
            None
        } else {
            let slot = &mut self.data[self.head];
            // Safety: the buffer is full, so `head` holds a live value.
            let evicted = unsafe { slot.assume_init_read() };
            slot.write(value);
            self.head = self.wrap_add(self.head, 1);
            Some(evicted)
        }
    }

    /// Removes and returns the oldest element.
    ///
    /// # Errors
    /// [`CollectionError::Empty`] if the buffer holds nothing.
    pub fn pop(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        // Safety: `head` holds a live value while `len > 0`.
        let value = unsafe { self.data[self.head].assume_init_read() };
        self.head = self.wrap_add(self.head, 1);
        self.len -= 1;
        Ok(value)
    }

    /// Returns the oldest element without removing it.
    ///
    /// # Errors
    /// [`CollectionError::Empty`] if the buffer holds nothing.
    pub fn peek(&self) -> Result<&T> {
        self.get(0).ok_or(CollectionError::Empty)
    }

    /// Element `index` positions after the oldest one.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            let slot = &self.data[self.wrap_add(self.head, index)];
            // Safety: logical indices below `len` map to live slots.
            Some(unsafe { slot.assume_init_ref() })
        } else {
            None
        }
    }

    /// The live elements as two slices, oldest first.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let first_len = self.len.min(N - self.head);
        let first = &self.data[self.head..self.head + first_len];
        let second = &self.data[..self.len - first_len];
        // Safety: both ranges cover live slots only.
        unsafe {
            (
                &*(first as *const [MaybeUninit<T>] as *const [T]),
                &*(second as *const [MaybeUninit<T>] as *const [T]),
            )
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        let (first, second) = self.as_slices();
        Iter {
            inner: first.iter().chain(second.iter()),
        }
    }

    pub fn clear(&mut self) {
        while self.pop().is_ok() {}
        self.head = 0;
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for RingBuffer<T, N> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone, const N: usize> Clone for RingBuffer<T, N> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        for item in self.iter() {
            out.push(item.clone());
        }
        out
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for RingBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, T> {
    inner: core::iter::Chain<core::slice::Iter<'a, T>, core::slice::Iter<'a, T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

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

impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T, const N: usize> IntoIterator for &'a RingBuffer<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
