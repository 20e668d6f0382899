//! Ordered storage engine: a red-black tree on slab-allocated nodes.

pub mod rb_tree;
pub mod slab;

pub use rb_tree::{First, Identity, KeyOf, RbTree, TreeViolation};
pub use slab::{NodeRef, SLAB_SIZE};
