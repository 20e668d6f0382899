//! Vector whose elements never move in memory.
//!
//! Each element is boxed individually and the vector stores only the boxes, so
//! reallocation, insertion and removal shuffle slot handles while the elements
//! themselves stay put. A reference taken with [`StableVec::push`] or
//! [`StableVec::get`] keeps pointing at the same address for as long as the element
//! is in the vector.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Index, IndexMut, Range};
use core::slice;

use crate::error::{CollectionError, Result};
use crate::vecs::array::{self, DynArray};

/// A sequence of individually allocated elements with stable addresses.
pub struct StableVec<T> {
    slots: DynArray<Box<T>>,
}

impl<T> StableVec<T> {
    pub const fn new() -> Self {
        Self {
            slots: DynArray::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: DynArray::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot capacity. Elements are allocated one by one and are not counted here.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Appends `value` and returns a reference to its final location.
    pub fn push(&mut self, value: T) -> &mut T {
        self.slots.push(Box::new(value));
        let last = self.slots.len() - 1;
        &mut self.slots[last]
    }

    pub fn pop(&mut self) -> Option<T> {
        self.slots.pop().map(|slot| *slot)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if there is nothing to pop.
    pub fn pop_back(&mut self) -> Result<T> {
        self.pop().ok_or(CollectionError::Empty)
    }

    /// Inserts `value` before `index`. Existing elements do not move.
    ///
    /// # Errors
    /// [`CollectionError::InvalidArgument`] if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<&mut T> {
        self.slots.insert(index, Box::new(value))?;
        Ok(&mut self.slots[index])
    }

    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        self.slots.remove(index).map(|slot| *slot)
    }

    /// Drops the elements in `range`; returns the index that now holds the
    /// element that followed it.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] for a reversed range or one ending past `len`.
    pub fn erase(&mut self, range: Range<usize>) -> Result<usize> {
        self.slots.erase(range)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).map(|slot| &**slot)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).map(|slot| &mut **slot)
    }

    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.get(index)
            .ok_or(CollectionError::out_of_range(index, self.len()))
    }

    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        self.get_mut(index)
            .ok_or(CollectionError::out_of_range(index, len))
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the vector holds no elements.
    pub fn front(&self) -> Result<&T> {
        self.get(0).ok_or(CollectionError::Empty)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the vector holds no elements.
    pub fn back(&self) -> Result<&T> {
        self.slots
            .last()
            .map(|slot| &**slot)
            .ok_or(CollectionError::Empty)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            inner: self.slots.iter_mut(),
        }
    }
}

impl<T> Default for StableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for StableVec<T> {
    /// Deep copy: every element is cloned into a freshly allocated slot.
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity(self.len());
        for item in self.iter() {
            out.push(item.clone());
        }
        out
    }
}

impl<T: fmt::Debug> fmt::Debug for StableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for StableVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for StableVec<T> {}

impl<T> Index<usize> for StableVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.slots[index]
    }
}

impl<T> IndexMut<usize> for StableVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.slots[index]
    }
}

impl<T> Extend<T> for StableVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> FromIterator<T> for StableVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

pub struct Iter<'a, T> {
    inner: slice::Iter<'a, Box<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| &**slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|slot| &**slot)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct IterMut<'a, T> {
    inner: slice::IterMut<'a, Box<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|slot| &mut **slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|slot| &mut **slot)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

pub struct IntoIter<T> {
    inner: array::IntoIter<Box<T>>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|slot| *slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|slot| *slot)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for StableVec<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            inner: self.slots.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a StableVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut StableVec<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
