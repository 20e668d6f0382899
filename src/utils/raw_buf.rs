//! Growth and allocation primitives shared by every dynamically sized container.
//!
//! [`RawBuf`] owns a block of uninitialized slots and nothing else: it never reads,
//! drops or tracks the elements living inside it. The owning container keeps the
//! logical length and is responsible for constructing slots before reading them
//! and destroying them before the buffer goes away.
//!
//! [`RollbackGuard`] gives construct-in-place loops the commit-or-rollback
//! behaviour: if a `Clone` call panics half way through filling a fresh buffer,
//! the guard destroys exactly the elements that were already constructed.

use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};
use std::alloc;

/// Geometric growth policy: at least double, and at least `required`.
#[inline]
pub(crate) fn grow_capacity(current: usize, required: usize) -> usize {
    current.saturating_mul(2).max(required)
}

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

/// An owned, uninitialized buffer of `capacity` slots of `T`.
pub(crate) struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for RawBuf<T> {}
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// A buffer with no allocation. Zero-sized types report unbounded capacity.
    pub(crate) const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: if Self::IS_ZST { usize::MAX } else { 0 },
            _marker: PhantomData,
        }
    }

    /// Allocates room for exactly `capacity` elements.
    ///
    /// # Panics
    /// Panics with `"capacity overflow"` if the byte size exceeds `isize::MAX`.
    /// Aborts through [`alloc::handle_alloc_error`] if the allocator fails.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        if Self::IS_ZST || capacity == 0 {
            return Self::new();
        }
        let layout = Self::layout_for(capacity);
        // Safety: layout has a non-zero size (non-ZST, capacity > 0).
        let raw = unsafe { alloc::alloc(layout) } as *mut T;
        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        };
        Self {
            ptr,
            cap: capacity,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn layout_for(capacity: usize) -> Layout {
        match Layout::array::<T>(capacity) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(),
        }
    }

    #[inline(always)]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }
}

impl<T> Drop for RawBuf<T> {
    fn drop(&mut self) {
        if !Self::IS_ZST && self.cap != 0 {
            // Safety: the pointer was produced by `alloc` with this exact layout.
            unsafe {
                alloc::dealloc(self.ptr.as_ptr() as *mut u8, Self::layout_for(self.cap));
            }
        }
    }
}

/// Writes `value` into an uninitialized slot.
///
/// # Safety
/// `slot` must be valid for writes and must not hold a live value.
#[inline(always)]
pub(crate) unsafe fn construct_at<T>(slot: *mut T, value: T) {
    unsafe { ptr::write(slot, value) }
}

/// Drops `len` initialized values starting at `first`.
///
/// # Safety
/// The range must hold initialized values that are not used afterwards.
#[inline]
pub(crate) unsafe fn destroy_range<T>(first: *mut T, len: usize) {
    unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, len)) }
}

/// Bitwise move of `len` values from `src` into uninitialized `dst`.
///
/// # Safety
/// The ranges must not overlap; `src` is logically uninitialized afterwards.
#[inline(always)]
pub(crate) unsafe fn relocate<T>(src: *const T, dst: *mut T, len: usize) {
    unsafe { ptr::copy_nonoverlapping(src, dst, len) }
}

/// Tracks a prefix of freshly constructed slots so a panic mid-fill can roll it back.
pub(crate) struct RollbackGuard<T> {
    base: *mut T,
    capacity: usize,
    constructed: usize,
}

impl<T> RollbackGuard<T> {
    /// # Safety
    /// `base` must point to `capacity` uninitialized, writable slots that outlive the guard.
    #[inline]
    pub(crate) unsafe fn new(base: *mut T, capacity: usize) -> Self {
        Self {
            base,
            capacity,
            constructed: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, value: T) {
        assert!(self.constructed < self.capacity, "rollback guard overflow");
        // Safety: slot `constructed` is within the range promised to `new` and unused.
        unsafe { construct_at(self.base.add(self.constructed), value) };
        self.constructed += 1;
    }

    /// Keeps the constructed prefix and returns its length.
    #[inline]
    pub(crate) fn commit(self) -> usize {
        let constructed = self.constructed;
        mem::forget(self);
        constructed
    }
}

impl<T> Drop for RollbackGuard<T> {
    fn drop(&mut self) {
        // Safety: exactly `constructed` slots were written by `push`.
        unsafe { destroy_range(self.base, self.constructed) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    #[test]
    fn test_raw_buf_growth_policy() {
        assert_eq!(grow_capacity(0, 1), 1);
        assert_eq!(grow_capacity(4, 5), 8);
        assert_eq!(grow_capacity(4, 20), 20);
        assert_eq!(grow_capacity(usize::MAX / 2 + 1, 1), usize::MAX);
    }

    #[test]
    fn test_raw_buf_zero_sized() {
        let buf: RawBuf<()> = RawBuf::with_capacity(10);
        assert_eq!(buf.capacity(), usize::MAX);
        let empty: RawBuf<u64> = RawBuf::new();
        assert_eq!(empty.capacity(), 0);
    }

    #[test]
    fn test_raw_buf_construct_relocate_destroy() {
        let src: RawBuf<String> = RawBuf::with_capacity(3);
        let dst: RawBuf<String> = RawBuf::with_capacity(3);
        unsafe {
            for i in 0..3 {
                construct_at(src.ptr().add(i), i.to_string());
            }
            relocate(src.ptr(), dst.ptr(), 3);
            assert_eq!(&*dst.ptr().add(2), "2");
            destroy_range(dst.ptr(), 3);
        }
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn test_raw_buf_capacity_overflow() {
        let _buf: RawBuf<u64> = RawBuf::with_capacity(usize::MAX);
    }

    #[test]
    fn test_raw_buf_rollback_on_panic() {
        struct Tracked(Rc<Cell<usize>>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let buf: RawBuf<Tracked> = RawBuf::with_capacity(4);
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut guard = unsafe { RollbackGuard::new(buf.ptr(), 4) };
            guard.push(Tracked(drops.clone()));
            guard.push(Tracked(drops.clone()));
            panic!("clone failed");
        }));
        assert!(result.is_err());
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_raw_buf_rollback_commit_keeps_values() {
        let buf: RawBuf<u32> = RawBuf::with_capacity(2);
        let mut guard = unsafe { RollbackGuard::new(buf.ptr(), 2) };
        guard.push(7);
        guard.push(9);
        assert_eq!(guard.commit(), 2);
        unsafe {
            assert_eq!(*buf.ptr(), 7);
            assert_eq!(*buf.ptr().add(1), 9);
        }
    }
}
