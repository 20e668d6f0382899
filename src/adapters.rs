//! LIFO and FIFO adapters over the crate's own sequences.

use core::fmt;

use crate::error::Result;
use crate::lists::list::{self, List};
use crate::vecs::array::DynArray;

/// Last-in first-out stack over a [`DynArray`].
pub struct Stack<T> {
    data: DynArray<T>,
}

impl<T> Stack<T> {
    pub const fn new() -> Self {
        Self {
            data: DynArray::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: DynArray::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    /// # Errors
    /// [`CollectionError::Empty`](crate::CollectionError::Empty) on an empty stack.
    pub fn pop(&mut self) -> Result<T> {
        self.data.pop_back()
    }

    /// # Errors
    /// [`CollectionError::Empty`](crate::CollectionError::Empty) on an empty stack.
    pub fn top(&self) -> Result<&T> {
        self.data.back()
    }

    pub fn top_mut(&mut self) -> Result<&mut T> {
        self.data.back_mut()
    }

    /// Elements from bottom to top.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Stack<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for Stack<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.data.extend(iter);
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// First-in first-out queue over a [`List`].
pub struct Queue<T> {
    data: List<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self { data: List::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn push(&mut self, value: T) {
        self.data.push_back(value);
    }

    /// Removes the oldest element.
    ///
    /// # Errors
    /// [`CollectionError::Empty`](crate::CollectionError::Empty) on an empty queue.
    pub fn pop(&mut self) -> Result<T> {
        self.data.pop_front()
    }

    pub fn front(&self) -> Result<&T> {
        self.data.front()
    }

    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.data.front_mut()
    }

    pub fn back(&self) -> Result<&T> {
        self.data.back()
    }

    pub fn back_mut(&mut self) -> Result<&mut T> {
        self.data.back_mut()
    }

    /// Elements from front to back.
    pub fn iter(&self) -> list::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.data.extend(iter);
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectionError;

    #[test]
    fn test_stack_lifo_order() {
        let mut stack = Stack::new();
        assert_eq!(stack.top(), Err(CollectionError::Empty));
        assert_eq!(stack.pop(), Err(CollectionError::Empty));
        stack.push(1);
        stack.push(2);
        stack.push(3);
        *stack.top_mut().unwrap() += 10;
        assert_eq!(stack.top(), Ok(&13));
        assert_eq!(stack.pop(), Ok(13));
        assert_eq!(stack.len(), 2);
        assert_eq!(format!("{:?}", stack), "[1, 2]");
    }

    #[test]
    fn test_queue_fifo_order() {
        let mut queue: Queue<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        queue.push("c".into());
        assert_eq!(queue.front().map(String::as_str), Ok("a"));
        assert_eq!(queue.back().map(String::as_str), Ok("c"));
        assert_eq!(queue.pop().as_deref(), Ok("a"));
        assert_eq!(queue.pop().as_deref(), Ok("b"));
        assert_eq!(queue.pop().as_deref(), Ok("c"));
        assert_eq!(queue.pop(), Err(CollectionError::Empty));
        assert_eq!(queue.front(), Err(CollectionError::Empty));
        assert!(queue.is_empty());
    }
}
