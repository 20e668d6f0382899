//! Singly linked list of boxed nodes.
//!
//! Positions are plain indices. The head link doubles as the *before-begin* position,
//! so `insert_after(0, x)` prepends and `erase_after(0)` removes the first element.
//! Used as the bucket chain of the hash table.

use core::fmt;
use core::iter::FusedIterator;

use crate::error::{CollectionError, Result};

type Link<T> = Option<Box<Node<T>>>;

struct Node<T> {
    value: T,
    next: Link<T>,
}

/// A singly linked list.
pub struct ForwardList<T> {
    head: Link<T>,
    len: usize,
}

impl<T> ForwardList<T> {
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn push_front(&mut self, value: T) -> &mut T {
        let next = self.head.take();
        self.len += 1;
        &mut self.head.insert(Box::new(Node { value, next })).value
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn pop_front(&mut self) -> Result<T> {
        let mut node = self.head.take().ok_or(CollectionError::Empty)?;
        self.head = node.next.take();
        self.len -= 1;
        Ok(node.value)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn front(&self) -> Result<&T> {
        self.head
            .as_deref()
            .map(|node| &node.value)
            .ok_or(CollectionError::Empty)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.head
            .as_deref_mut()
            .map(|node| &mut node.value)
            .ok_or(CollectionError::Empty)
    }

    /// The link that precedes element `position` (the head link for 0).
    fn link_mut(&mut self, position: usize) -> &mut Link<T> {
        debug_assert!(position <= self.len);
        let mut link = &mut self.head;
        for _ in 0..position {
            link = &mut link.as_mut().expect("position within list length").next;
        }
        link
    }

    /// Inserts `value` after `position`, so it ends up at index `position`.
    ///
    /// # Errors
    /// [`CollectionError::InvalidArgument`] if `position > len`.
    pub fn insert_after(&mut self, position: usize, value: T) -> Result<&mut T> {
        if position > self.len {
            return Err(CollectionError::invalid_argument(position, self.len));
        }
        self.len += 1;
        let link = self.link_mut(position);
        let next = link.take();
        Ok(&mut link.insert(Box::new(Node { value, next })).value)
    }

    /// Removes the element that follows `position`, i.e. the one at index `position`.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if there is no such element.
    pub fn erase_after(&mut self, position: usize) -> Result<T> {
        if position >= self.len {
            return Err(CollectionError::out_of_range(position, self.len));
        }
        let link = self.link_mut(position);
        let mut node = link.take().expect("position within list length");
        *link = node.next.take();
        self.len -= 1;
        Ok(node.value)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.iter().nth(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.iter_mut().nth(index)
    }

    /// Index of the first element matching `pred`.
    pub fn position<F>(&self, pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().position(pred)
    }

    /// Keeps only the elements for which `f` returns `true`, preserving their order.
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
        // Unlinks in place so a panicking predicate leaves a consistent list.
        let mut cursor = &mut self.head;
        while cursor.is_some() {
            let keep = f(&mut cursor.as_mut().expect("cursor is occupied").value);
            if keep {
                cursor = &mut cursor.as_mut().expect("cursor is occupied").next;
            } else {
                let mut node = cursor.take().expect("cursor is occupied");
                *cursor = node.next.take();
                self.len -= 1;
            }
        }
    }

    pub fn reverse(&mut self) {
        let mut rest = self.head.take();
        while let Some(mut node) = rest {
            rest = node.next.take();
            node.next = self.head.take();
            self.head = Some(node);
        }
    }

    pub fn clear(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.next.take();
        }
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head.as_deref_mut(),
            remaining: self.len,
        }
    }
}

impl<T> Drop for ForwardList<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for ForwardList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ForwardList<T> {
    /// Builds a list in iteration order.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new();
        let mut len = 0;
        let mut tail = &mut out.head;
        for value in iter {
            tail = &mut tail.insert(Box::new(Node { value, next: None })).next;
            len += 1;
        }
        out.len = len;
        out
    }
}

impl<T: Clone> Clone for ForwardList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for ForwardList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for ForwardList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ForwardList<T> {}

pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
        }
    }
}

pub struct IterMut<'a, T> {
    next: Option<&'a mut Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        self.next.take().map(|node| {
            self.next = node.next.as_deref_mut();
            self.remaining -= 1;
            &mut node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

pub struct IntoIter<T>(ForwardList<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for ForwardList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a ForwardList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut ForwardList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
