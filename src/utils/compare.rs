//! Ordering strategies for the sorted containers.
//!
//! Every sorted container is parameterized by a [`Compare`] strategy instead of
//! requiring `Ord` directly. [`NaturalOrder`] (the default) defers to `Ord`;
//! any `Fn(&K, &K) -> bool` closure describing a strict "less than" works too.

use core::cmp::Ordering;

/// A strict weak ordering over `Q`.
///
/// Two values are *equivalent* when neither is less than the other.
pub trait Compare<Q: ?Sized> {
    /// Returns `true` if `a` orders strictly before `b`.
    fn less(&self, a: &Q, b: &Q) -> bool;

    /// Three-way comparison derived from [`less`](Compare::less).
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Returns `true` if `a` and `b` are equivalent under this ordering.
    #[inline]
    fn equivalent(&self, a: &Q, b: &Q) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Orders values by their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<Q: Ord + ?Sized> Compare<Q> for NaturalOrder {
    #[inline(always)]
    fn less(&self, a: &Q, b: &Q) -> bool {
        a < b
    }

    #[inline(always)]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        a.cmp(b)
    }
}

/// Orders values by the reverse of their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder;

impl<Q: Ord + ?Sized> Compare<Q> for ReverseOrder {
    #[inline(always)]
    fn less(&self, a: &Q, b: &Q) -> bool {
        b < a
    }
}

impl<Q: ?Sized, F> Compare<Q> for F
where
    F: Fn(&Q, &Q) -> bool,
{
    #[inline(always)]
    fn less(&self, a: &Q, b: &Q) -> bool {
        self(a, b)
    }
}
