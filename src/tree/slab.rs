//! Node storage for the red-black tree.
//!
//! Nodes are carved out of fixed-size slabs of [`SLAB_SIZE`] slots. A slab's buffer
//! is allocated once and never reallocated, so a slot keeps its address for the
//! lifetime of the pool. Vacated slots form an intrusive free list and each slot
//! carries a generation counter that is bumped whenever its node is removed.

use crate::vecs::array::DynArray;

/// Slots per slab.
pub const SLAB_SIZE: usize = 64;

pub(super) type Link = Option<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Color {
    Red,
    Black,
}

/// Structural part of a node, kept apart from the value so traversal never
/// touches the value.
#[derive(Debug, Clone, Copy)]
pub(super) struct Links {
    pub(super) parent: Link,
    pub(super) left: Link,
    pub(super) right: Link,
    pub(super) color: Color,
}

impl Links {
    pub(super) const fn red_leaf(parent: Link) -> Self {
        Self {
            parent,
            left: None,
            right: None,
            color: Color::Red,
        }
    }
}

/// Position of a node inside a tree.
///
/// A `NodeRef` survives insertion and removal of *other* nodes; once its own node
/// is erased every lookup through it returns `None`, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(super) index: usize,
    pub(super) generation: u32,
}

enum SlotState<V> {
    Occupied(V),
    Vacant { next_free: Link },
}

pub(super) struct Slot<V> {
    links: Links,
    generation: u32,
    state: SlotState<V>,
}

pub(super) struct NodePool<V> {
    slabs: DynArray<DynArray<Slot<V>>>,
    free_head: Link,
}

impl<V> NodePool<V> {
    pub(super) const fn new() -> Self {
        Self {
            slabs: DynArray::new(),
            free_head: None,
        }
    }

    /// Total slots allocated across all slabs.
    pub(super) fn capacity(&self) -> usize {
        self.slabs.len() * SLAB_SIZE
    }

    pub(super) fn insert(&mut self, value: V, links: Links) -> usize {
        if let Some(index) = self.free_head {
            let slot = self.slot_mut(index);
            let next_free = match slot.state {
                SlotState::Vacant { next_free } => next_free,
                SlotState::Occupied(_) => unreachable!("free list points at a live node"),
            };
            slot.links = links;
            slot.state = SlotState::Occupied(value);
            self.free_head = next_free;
            return index;
        }

        let needs_slab = self
            .slabs
            .last()
            .is_none_or(|slab| slab.len() == SLAB_SIZE);
        if needs_slab {
            self.slabs.push(DynArray::with_capacity(SLAB_SIZE));
            log::debug!(
                "rb tree node pool grew to {} slabs ({} slots)",
                self.slabs.len(),
                self.capacity()
            );
        }
        let slab_index = self.slabs.len() - 1;
        let slab = &mut self.slabs[slab_index];
        slab.push(Slot {
            links,
            generation: 0,
            state: SlotState::Occupied(value),
        });
        slab_index * SLAB_SIZE + slab.len() - 1
    }

    /// Vacates `index` and returns its value.
    pub(super) fn remove(&mut self, index: usize) -> V {
        let free_head = self.free_head;
        let slot = self.slot_mut(index);
        let state = core::mem::replace(
            &mut slot.state,
            SlotState::Vacant {
                next_free: free_head,
            },
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free_head = Some(index);
        match state {
            SlotState::Occupied(value) => value,
            SlotState::Vacant { .. } => unreachable!("removed a vacant node"),
        }
    }

    /// Vacates every live slot while keeping the slabs.
    pub(super) fn clear(&mut self) {
        self.free_head = None;
        for slab_index in (0..self.slabs.len()).rev() {
            let slab = &mut self.slabs[slab_index];
            for offset in (0..slab.len()).rev() {
                let slot = &mut slab[offset];
                if let SlotState::Occupied(_) = slot.state {
                    slot.generation = slot.generation.wrapping_add(1);
                }
                slot.state = SlotState::Vacant {
                    next_free: self.free_head,
                };
                self.free_head = Some(slab_index * SLAB_SIZE + offset);
            }
        }
    }

    #[inline]
    fn slot(&self, index: usize) -> &Slot<V> {
        &self.slabs[index / SLAB_SIZE][index % SLAB_SIZE]
    }

    #[inline]
    fn slot_mut(&mut self, index: usize) -> &mut Slot<V> {
        &mut self.slabs[index / SLAB_SIZE][index % SLAB_SIZE]
    }

    #[inline]
    pub(super) fn links(&self, index: usize) -> &Links {
        &self.slot(index).links
    }

    #[inline]
    pub(super) fn links_mut(&mut self, index: usize) -> &mut Links {
        &mut self.slot_mut(index).links
    }

    #[inline]
    pub(super) fn value(&self, index: usize) -> &V {
        match &self.slot(index).state {
            SlotState::Occupied(value) => value,
            SlotState::Vacant { .. } => unreachable!("linked node is vacant"),
        }
    }

    #[inline]
    pub(super) fn value_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slot_mut(index).state {
            SlotState::Occupied(value) => value,
            SlotState::Vacant { .. } => unreachable!("linked node is vacant"),
        }
    }

    pub(super) fn node_ref(&self, index: usize) -> NodeRef {
        NodeRef {
            index,
            generation: self.slot(index).generation,
        }
    }

    /// Slot index behind `node` if it still names a live node.
    pub(super) fn resolve(&self, node: NodeRef) -> Link {
        let slot = self
            .slabs
            .get(node.index / SLAB_SIZE)?
            .get(node.index % SLAB_SIZE)?;
        match slot.state {
            SlotState::Occupied(_) if slot.generation == node.generation => Some(node.index),
            _ => None,
        }
    }

    pub(super) fn raw(&mut self) -> RawPool<V> {
        RawPool {
            slabs: self.slabs.as_mut_ptr(),
        }
    }
}

/// Unchecked pool access for iterators that hand out `&mut V` to several nodes.
///
/// Links are read by value and values are reached through raw place projections,
/// so no reference ever covers a value that was already handed out.
pub(super) struct RawPool<V> {
    slabs: *mut DynArray<Slot<V>>,
}

impl<V> Clone for RawPool<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for RawPool<V> {}

impl<V> RawPool<V> {
    /// # Safety
    /// `index` must name a slot of the pool this was created from, and the pool
    /// must be exclusively borrowed for as long as this is used.
    unsafe fn slot(self, index: usize) -> *mut Slot<V> {
        unsafe {
            let slab = &*self.slabs.add(index / SLAB_SIZE);
            slab.as_ptr().add(index % SLAB_SIZE) as *mut Slot<V>
        }
    }

    /// # Safety
    /// Same as [`RawPool::slot`].
    pub(super) unsafe fn links(self, index: usize) -> Links {
        unsafe { core::ptr::addr_of!((*self.slot(index)).links).read() }
    }

    /// # Safety
    /// Same as [`RawPool::slot`]; additionally the slot must be live and no other
    /// reference to its value may exist for `'a`.
    pub(super) unsafe fn value_mut<'a>(self, index: usize) -> &'a mut V {
        let state = unsafe { &mut *core::ptr::addr_of_mut!((*self.slot(index)).state) };
        match state {
            SlotState::Occupied(value) => value,
            SlotState::Vacant { .. } => unreachable!("linked node is vacant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_pool_reuses_freed_slots() {
        let mut pool = NodePool::new();
        let a = pool.insert("a", Links::red_leaf(None));
        let b = pool.insert("b", Links::red_leaf(None));
        assert_eq!(pool.capacity(), SLAB_SIZE);
        let stale = pool.node_ref(a);
        assert_eq!(pool.remove(a), "a");
        assert_eq!(pool.resolve(stale), None);
        let c = pool.insert("c", Links::red_leaf(None));
        assert_eq!(c, a);
        assert_eq!(pool.resolve(stale), None);
        assert_eq!(pool.resolve(pool.node_ref(b)), Some(b));
        assert_eq!(*pool.value(c), "c");
    }

    #[test]
    fn test_node_pool_grows_by_whole_slabs() {
        let mut pool = NodePool::new();
        for i in 0..SLAB_SIZE + 1 {
            pool.insert(i, Links::red_leaf(None));
        }
        assert_eq!(pool.capacity(), 2 * SLAB_SIZE);
        assert_eq!(*pool.value(SLAB_SIZE), SLAB_SIZE);
    }

    #[test]
    fn test_node_pool_clear_keeps_slabs_and_invalidates_refs() {
        let mut pool = NodePool::new();
        let first = pool.insert(1, Links::red_leaf(None));
        let node = pool.node_ref(first);
        pool.insert(2, Links::red_leaf(None));
        pool.clear();
        assert_eq!(pool.capacity(), SLAB_SIZE);
        assert_eq!(pool.resolve(node), None);
        assert_eq!(pool.insert(3, Links::red_leaf(None)), 0);
        assert_eq!(pool.insert(4, Links::red_leaf(None)), 1);
    }
}
