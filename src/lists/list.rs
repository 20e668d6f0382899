//! Doubly linked list stored in an index arena.
//!
//! Nodes live in a [`DynArray`]; slot 0 is a permanent sentinel whose `next` is the
//! front and whose `prev` is the back, so every link operation is branch-free.
//! Removed slots go onto a free list and get their generation bumped, which is how
//! a stale [`ListHandle`] is told apart from a live one.

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::error::{CollectionError, Result};
use crate::vecs::array::DynArray;

const SENTINEL: usize = 0;

/// Stable position of an element in a [`List`].
///
/// Stays valid across any other insertion or removal and is rejected once its
/// own element has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListHandle {
    index: usize,
    generation: u32,
}

enum Payload<T> {
    Sentinel,
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

struct Node<T> {
    payload: Payload<T>,
    prev: usize,
    next: usize,
    generation: u32,
}

/// A doubly linked list with O(1) push, pop, unlink and move-to-front.
pub struct List<T> {
    nodes: DynArray<Node<T>>,
    free_head: Option<usize>,
    len: usize,
}

impl<T> List<T> {
    pub fn new() -> Self {
        let mut nodes = DynArray::new();
        nodes.push(Node {
            payload: Payload::Sentinel,
            prev: SENTINEL,
            next: SENTINEL,
            generation: 0,
        });
        Self {
            nodes,
            free_head: None,
            len: 0,
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

    fn alloc(&mut self, value: T) -> usize {
        match self.free_head {
            Some(index) => {
                let node = &mut self.nodes[index];
                self.free_head = match node.payload {
                    Payload::Vacant { next_free } => next_free,
                    _ => unreachable!("free list points at a live node"),
                };
                node.payload = Payload::Occupied(value);
                index
            }
            None => {
                self.nodes.push(Node {
                    payload: Payload::Occupied(value),
                    prev: SENTINEL,
                    next: SENTINEL,
                    generation: 0,
                });
                self.nodes.len() - 1
            }
        }
    }

    /// Links `index` in front of `at`.
    fn link_before(&mut self, index: usize, at: usize) {
        let prev = self.nodes[at].prev;
        self.nodes[index].prev = prev;
        self.nodes[index].next = at;
        self.nodes[prev].next = index;
        self.nodes[at].prev = index;
    }

    fn unlink(&mut self, index: usize) {
        let Node { prev, next, .. } = self.nodes[index];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn release(&mut self, index: usize) -> T {
        self.unlink(index);
        let node = &mut self.nodes[index];
        let payload = core::mem::replace(
            &mut node.payload,
            Payload::Vacant {
                next_free: self.free_head,
            },
        );
        node.generation = node.generation.wrapping_add(1);
        self.free_head = Some(index);
        self.len -= 1;
        match payload {
            Payload::Occupied(value) => value,
            _ => unreachable!("released a slot that held no value"),
        }
    }

    fn handle_of(&self, index: usize) -> ListHandle {
        ListHandle {
            index,
            generation: self.nodes[index].generation,
        }
    }

    fn resolve(&self, handle: ListHandle) -> Option<usize> {
        let node = self.nodes.get(handle.index)?;
        match node.payload {
            Payload::Occupied(_) if node.generation == handle.generation => Some(handle.index),
            _ => None,
        }
    }

    fn value(&self, index: usize) -> &T {
        match &self.nodes[index].payload {
            Payload::Occupied(value) => value,
            _ => unreachable!("linked slot holds no value"),
        }
    }

    fn value_mut(&mut self, index: usize) -> &mut T {
        match &mut self.nodes[index].payload {
            Payload::Occupied(value) => value,
            _ => unreachable!("linked slot holds no value"),
        }
    }

    pub fn push_front(&mut self, value: T) -> ListHandle {
        let index = self.alloc(value);
        let front = self.nodes[SENTINEL].next;
        self.link_before(index, front);
        self.len += 1;
        self.handle_of(index)
    }

    pub fn push_back(&mut self, value: T) -> ListHandle {
        let index = self.alloc(value);
        self.link_before(index, SENTINEL);
        self.len += 1;
        self.handle_of(index)
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn pop_front(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        let front = self.nodes[SENTINEL].next;
        Ok(self.release(front))
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn pop_back(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        let back = self.nodes[SENTINEL].prev;
        Ok(self.release(back))
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn front(&self) -> Result<&T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        Ok(self.value(self.nodes[SENTINEL].next))
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn back(&self) -> Result<&T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        Ok(self.value(self.nodes[SENTINEL].prev))
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn front_mut(&mut self) -> Result<&mut T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        let front = self.nodes[SENTINEL].next;
        Ok(self.value_mut(front))
    }

    /// # Errors
    /// [`CollectionError::Empty`] if the list holds nothing.
    pub fn back_mut(&mut self) -> Result<&mut T> {
        if self.len == 0 {
            return Err(CollectionError::Empty);
        }
        let back = self.nodes[SENTINEL].prev;
        Ok(self.value_mut(back))
    }

    pub fn front_handle(&self) -> Option<ListHandle> {
        (self.len > 0).then(|| self.handle_of(self.nodes[SENTINEL].next))
    }

    pub fn back_handle(&self) -> Option<ListHandle> {
        (self.len > 0).then(|| self.handle_of(self.nodes[SENTINEL].prev))
    }

    pub fn get(&self, handle: ListHandle) -> Option<&T> {
        let index = self.resolve(handle)?;
        Some(self.value(index))
    }

    pub fn get_mut(&mut self, handle: ListHandle) -> Option<&mut T> {
        let index = self.resolve(handle)?;
        Some(self.value_mut(index))
    }

    /// Unlinks the element behind `handle` and returns it.
    ///
    /// # Errors
    /// [`CollectionError::NotFound`] if the handle is stale.
    pub fn remove(&mut self, handle: ListHandle) -> Result<T> {
        let index = self.resolve(handle).ok_or(CollectionError::NotFound)?;
        Ok(self.release(index))
    }

    /// Relinks the element behind `handle` at the front. The handle stays valid.
    ///
    /// # Errors
    /// [`CollectionError::NotFound`] if the handle is stale.
    pub fn move_to_front(&mut self, handle: ListHandle) -> Result<()> {
        let index = self.resolve(handle).ok_or(CollectionError::NotFound)?;
        if self.nodes[SENTINEL].next != index {
            self.unlink(index);
            let front = self.nodes[SENTINEL].next;
            self.link_before(index, front);
        }
        Ok(())
    }

    /// Removes every element. Outstanding handles all become stale.
    pub fn clear(&mut self) {
        while self.pop_back().is_ok() {}
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.nodes[SENTINEL].next,
            back: self.nodes[SENTINEL].prev,
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            front: self.nodes[SENTINEL].next,
            back: self.nodes[SENTINEL].prev,
            remaining: self.len,
            nodes: self.nodes.as_mut_ptr(),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

pub struct Iter<'a, T> {
    list: &'a List<T>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front;
        self.front = self.list.nodes[index].next;
        self.remaining -= 1;
        Some(self.list.value(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back;
        self.back = self.list.nodes[index].prev;
        self.remaining -= 1;
        Some(self.list.value(index))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator; walks the arena through a raw pointer so that each yielded
/// `&mut T` can outlive the call that produced it.
pub struct IterMut<'a, T> {
    nodes: *mut Node<T>,
    front: usize,
    back: usize,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    /// # Safety
    /// `index` must be a linked slot not yet yielded by this iterator.
    unsafe fn take(&mut self, index: usize) -> &'a mut T {
        let node = unsafe { &mut *self.nodes.add(index) };
        match &mut node.payload {
            Payload::Occupied(value) => value,
            _ => unreachable!("linked slot holds no value"),
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front;
        // Safety: `front` is in bounds of the arena borrowed for `'a`.
        self.front = unsafe { (*self.nodes.add(index)).next };
        self.remaining -= 1;
        // Safety: front and back cursors never cross while `remaining > 0`.
        Some(unsafe { self.take(index) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back;
        // Safety: `back` is in bounds of the arena borrowed for `'a`.
        self.back = unsafe { (*self.nodes.add(index)).prev };
        self.remaining -= 1;
        // Safety: front and back cursors never cross while `remaining > 0`.
        Some(unsafe { self.take(index) })
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

pub struct IntoIter<T>(List<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.0.pop_back().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut List<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(list: &List<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_list_push_pop_both_ends() {
        let mut list = List::new();
        list.push_back(2);
        list.push_front(1);
        list.push_back(3);
        assert_eq!(collect(&list), vec![1, 2, 3]);
        assert_eq!(list.front(), Ok(&1));
        assert_eq!(list.back(), Ok(&3));
        assert_eq!(list.pop_front(), Ok(1));
        assert_eq!(list.pop_back(), Ok(3));
        assert_eq!(list.pop_back(), Ok(2));
        assert_eq!(list.pop_back(), Err(CollectionError::Empty));
        assert_eq!(list.front(), Err(CollectionError::Empty));
    }

    #[test]
    fn test_list_handles_and_move_to_front() {
        let mut list = List::new();
        let a = list.push_back(1);
        let b = list.push_back(2);
        let c = list.push_back(3);
        list.move_to_front(c).unwrap();
        assert_eq!(collect(&list), vec![3, 1, 2]);
        assert_eq!(list.remove(a), Ok(1));
        assert_eq!(list.get(a), None);
        assert_eq!(list.remove(a), Err(CollectionError::NotFound));
        assert_eq!(list.move_to_front(a), Err(CollectionError::NotFound));
        *list.get_mut(b).unwrap() = 20;
        assert_eq!(collect(&list), vec![3, 20]);
        assert_eq!(list.back_handle(), Some(b));
        assert_eq!(list.front_handle(), Some(c));
    }

    #[test]
    fn test_list_reused_slot_rejects_stale_handle() {
        let mut list = List::new();
        let old = list.push_back(1);
        list.pop_back().unwrap();
        let new = list.push_back(2);
        assert_eq!(list.get(old), None);
        assert_eq!(list.get(new), Some(&2));
        list.clear();
        assert_eq!(list.get(new), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_list_iterators() {
        let mut list: List<i32> = (1..=4).collect();
        for x in list.iter_mut() {
            *x *= 2;
        }
        assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), vec![8, 6, 4, 2]);
        let mut iter = list.iter_mut();
        *iter.next_back().unwrap() = 0;
        *iter.next().unwrap() = 1;
        assert_eq!(collect(&list), vec![1, 4, 6, 0]);
        let copy = list.clone();
        assert_eq!(copy, list);
        assert_eq!(list.into_iter().rev().collect::<Vec<_>>(), vec![0, 6, 4, 1]);
    }
}
