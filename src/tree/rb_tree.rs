//! Red-black tree over slab-allocated nodes.
//!
//! [`RbTree`] is the engine behind the ordered map and set family. It stores whole
//! values `V` and orders them by a key extracted with a [`KeyOf`] projection under a
//! [`Compare`] strategy, so one implementation serves sets (`Identity`), maps
//! (`First`), and both their unique and multi flavours.
//!
//! Rebalancing follows the textbook scheme: insertion recolours or rotates around the
//! new red leaf, erasure resolves a "double black" with the four sibling cases. A node
//! with two children is erased by relinking its in-order successor into its place, so
//! the only slot ever freed is the erased node's own and every other [`NodeRef`] stays
//! valid.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use thiserror::Error;

use super::slab::{Color, Link, Links, NodePool, NodeRef, RawPool};
use crate::utils::compare::{Compare, NaturalOrder};
use crate::vecs::array::{self, DynArray};
use crate::vecs::small_vec::SmallVec;

/// Extracts the ordering key from a stored value.
pub trait KeyOf<V> {
    type Key;

    fn key(value: &V) -> &Self::Key;
}

/// The value is its own key. Used by sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl<T> KeyOf<T> for Identity {
    type Key = T;

    #[inline(always)]
    fn key(value: &T) -> &T {
        value
    }
}

/// The key is the first element of a pair. Used by maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct First;

impl<K, V> KeyOf<(K, V)> for First {
    type Key = K;

    #[inline(always)]
    fn key(value: &(K, V)) -> &K {
        &value.0
    }
}

/// A broken structural property reported by [`RbTree::validate`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeViolation {
    #[error("root node is red")]
    RedRoot,
    #[error("red node {node} has a red child")]
    RedRed { node: usize },
    #[error("black height differs between the subtrees of node {node}")]
    BlackHeight { node: usize },
    #[error("node {node} orders before its in-order predecessor")]
    OutOfOrder { node: usize },
    #[error("node {node} has the same key as its in-order predecessor")]
    DuplicateKey { node: usize },
    #[error("node {node} has an inconsistent parent link")]
    ParentLink { node: usize },
    #[error("tree reports {expected} elements but holds {found}")]
    SizeMismatch { expected: usize, found: usize },
}

// --- Navigation over a links accessor ---
//
// Shared by the tree itself and by iterators that only hold a raw pool.

fn minimum_with(links: impl Fn(usize) -> Links, mut id: usize) -> usize {
    while let Some(left) = links(id).left {
        id = left;
    }
    id
}

fn maximum_with(links: impl Fn(usize) -> Links, mut id: usize) -> usize {
    while let Some(right) = links(id).right {
        id = right;
    }
    id
}

fn successor_with(links: impl Fn(usize) -> Links, id: usize) -> Link {
    if let Some(right) = links(id).right {
        return Some(minimum_with(links, right));
    }
    let mut cur = id;
    let mut parent = links(cur).parent;
    while let Some(p) = parent {
        if links(p).right != Some(cur) {
            break;
        }
        cur = p;
        parent = links(p).parent;
    }
    parent
}

fn predecessor_with(links: impl Fn(usize) -> Links, id: usize) -> Link {
    if let Some(left) = links(id).left {
        return Some(maximum_with(links, left));
    }
    let mut cur = id;
    let mut parent = links(cur).parent;
    while let Some(p) = parent {
        if links(p).left != Some(cur) {
            break;
        }
        cur = p;
        parent = links(p).parent;
    }
    parent
}

/// A red-black tree storing values `V` ordered by `KoV::key` under `C`.
pub struct RbTree<V, KoV, C = NaturalOrder> {
    pool: NodePool<V>,
    root: Link,
    len: usize,
    compare: C,
    _key_of: PhantomData<fn() -> KoV>,
}

impl<V, KoV, C: Default> RbTree<V, KoV, C> {
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<V, KoV, C: Default> Default for RbTree<V, KoV, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, KoV, C> RbTree<V, KoV, C> {
    pub const fn with_comparator(compare: C) -> Self {
        Self {
            pool: NodePool::new(),
            root: None,
            len: 0,
            compare,
            _key_of: PhantomData,
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

    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Node slots allocated so far (live and free).
    pub fn slab_capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Drops every value. Slabs are kept for reuse and all node refs go stale.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.root = None;
        self.len = 0;
    }

    // --- Link helpers ---

    #[inline]
    fn links(&self, id: usize) -> Links {
        *self.pool.links(id)
    }

    #[inline]
    fn parent(&self, id: usize) -> Link {
        self.pool.links(id).parent
    }

    #[inline]
    fn left(&self, id: usize) -> Link {
        self.pool.links(id).left
    }

    #[inline]
    fn right(&self, id: usize) -> Link {
        self.pool.links(id).right
    }

    #[inline]
    fn color(&self, id: usize) -> Color {
        self.pool.links(id).color
    }

    #[inline]
    fn set_color(&mut self, id: usize, color: Color) {
        self.pool.links_mut(id).color = color;
    }

    /// Nil links count as black.
    #[inline]
    fn is_red(&self, link: Link) -> bool {
        link.is_some_and(|id| self.color(id) == Color::Red)
    }

    fn minimum(&self, id: usize) -> usize {
        minimum_with(|i| self.links(i), id)
    }

    fn maximum(&self, id: usize) -> usize {
        maximum_with(|i| self.links(i), id)
    }

    fn succ(&self, id: usize) -> Link {
        successor_with(|i| self.links(i), id)
    }

    fn pred(&self, id: usize) -> Link {
        predecessor_with(|i| self.links(i), id)
    }

    fn first_id(&self) -> Link {
        self.root.map(|root| self.minimum(root))
    }

    fn last_id(&self) -> Link {
        self.root.map(|root| self.maximum(root))
    }

    /// Slot ids in order.
    fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        core::iter::successors(self.first_id(), |&id| self.succ(id))
    }

    /// Points whichever link of `parent` referenced `old` (or the root) at `new`.
    fn replace_child(&mut self, parent: Link, old: usize, new: Link) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let links = self.pool.links_mut(p);
                if links.left == Some(old) {
                    links.left = new;
                } else {
                    links.right = new;
                }
            }
        }
    }

    fn rotate_left(&mut self, x: usize) {
        let y = self.right(x).expect("rotate_left needs a right child");
        let y_left = self.left(y);
        self.pool.links_mut(x).right = y_left;
        if let Some(b) = y_left {
            self.pool.links_mut(b).parent = Some(x);
        }
        let x_parent = self.parent(x);
        self.pool.links_mut(y).parent = x_parent;
        self.replace_child(x_parent, x, Some(y));
        self.pool.links_mut(y).left = Some(x);
        self.pool.links_mut(x).parent = Some(y);
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.left(x).expect("rotate_right needs a left child");
        let y_right = self.right(y);
        self.pool.links_mut(x).left = y_right;
        if let Some(b) = y_right {
            self.pool.links_mut(b).parent = Some(x);
        }
        let x_parent = self.parent(x);
        self.pool.links_mut(y).parent = x_parent;
        self.replace_child(x_parent, x, Some(y));
        self.pool.links_mut(y).right = Some(x);
        self.pool.links_mut(x).parent = Some(y);
    }

    /// Replaces the subtree rooted at `u` with the one rooted at `v`.
    fn transplant(&mut self, u: usize, v: Link) {
        let u_parent = self.parent(u);
        self.replace_child(u_parent, u, v);
        if let Some(v) = v {
            self.pool.links_mut(v).parent = u_parent;
        }
    }

    // --- Insertion ---

    fn attach(&mut self, value: V, parent: Link, go_left: bool) -> NodeRef {
        let id = self.pool.insert(value, Links::red_leaf(parent));
        match parent {
            None => self.root = Some(id),
            Some(p) => {
                let links = self.pool.links_mut(p);
                if go_left {
                    links.left = Some(id);
                } else {
                    links.right = Some(id);
                }
            }
        }
        self.len += 1;
        self.insert_fixup(id);
        self.pool.node_ref(id)
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while let Some(p) = self.parent(z).filter(|&p| self.color(p) == Color::Red) {
            let g = self.parent(p).expect("a red node is never the root");
            if self.left(g) == Some(p) {
                if let Some(uncle) = self.right(g).filter(|&u| self.color(u) == Color::Red) {
                    self.set_color(p, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    let mut p = p;
                    if self.right(p) == Some(z) {
                        z = p;
                        self.rotate_left(z);
                        p = self.parent(z).expect("rotated node has a parent");
                    }
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_right(g);
                }
            } else if let Some(uncle) = self.left(g).filter(|&u| self.color(u) == Color::Red) {
                self.set_color(p, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(g, Color::Red);
                z = g;
            } else {
                let mut p = p;
                if self.left(p) == Some(z) {
                    z = p;
                    self.rotate_right(z);
                    p = self.parent(z).expect("rotated node has a parent");
                }
                self.set_color(p, Color::Black);
                self.set_color(g, Color::Red);
                self.rotate_left(g);
            }
        }
        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    // --- Erasure ---

    /// Removes the node at `node` and returns its value with the position of the
    /// element that followed it. Returns `None` for a stale `NodeRef`.
    pub fn erase(&mut self, node: NodeRef) -> Option<(V, Option<NodeRef>)> {
        let z = self.pool.resolve(node)?;
        let next = self.succ(z);
        self.unlink(z);
        self.len -= 1;
        let value = self.pool.remove(z);
        Some((value, next.map(|id| self.pool.node_ref(id))))
    }

    fn unlink(&mut self, z: usize) {
        let z_links = self.links(z);
        let mut removed_color = z_links.color;
        let x;
        let x_parent;
        match (z_links.left, z_links.right) {
            (None, right) => {
                x = right;
                x_parent = z_links.parent;
                self.transplant(z, right);
            }
            (left, None) => {
                x = left;
                x_parent = z_links.parent;
                self.transplant(z, left);
            }
            (Some(z_left), Some(z_right)) => {
                let y = self.minimum(z_right);
                removed_color = self.color(y);
                x = self.right(y);
                if y == z_right {
                    x_parent = Some(y);
                } else {
                    x_parent = self.parent(y);
                    self.transplant(y, x);
                    self.pool.links_mut(y).right = Some(z_right);
                    self.pool.links_mut(z_right).parent = Some(y);
                }
                self.transplant(z, Some(y));
                self.pool.links_mut(y).left = Some(z_left);
                self.pool.links_mut(z_left).parent = Some(y);
                self.set_color(y, z_links.color);
            }
        }
        if removed_color == Color::Black {
            self.erase_fixup(x, x_parent);
        }
    }

    /// Resolves the extra black carried by `x` (possibly nil, hence `parent`).
    fn erase_fixup(&mut self, mut x: Link, mut parent: Link) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else { break };
            if self.left(p) == x {
                let mut w = self.right(p).expect("double black node has a sibling");
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    w = self.right(p).expect("double black node has a sibling");
                }
                if !self.is_red(self.left(w)) && !self.is_red(self.right(w)) {
                    self.set_color(w, Color::Red);
                    x = Some(p);
                    parent = self.parent(p);
                } else {
                    if !self.is_red(self.right(w)) {
                        if let Some(near) = self.left(w) {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(p).expect("double black node has a sibling");
                    }
                    self.set_color(w, self.color(p));
                    self.set_color(p, Color::Black);
                    if let Some(far) = self.right(w) {
                        self.set_color(far, Color::Black);
                    }
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let mut w = self.left(p).expect("double black node has a sibling");
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    w = self.left(p).expect("double black node has a sibling");
                }
                if !self.is_red(self.left(w)) && !self.is_red(self.right(w)) {
                    self.set_color(w, Color::Red);
                    x = Some(p);
                    parent = self.parent(p);
                } else {
                    if !self.is_red(self.left(w)) {
                        if let Some(near) = self.right(w) {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(p).expect("double black node has a sibling");
                    }
                    self.set_color(w, self.color(p));
                    self.set_color(p, Color::Black);
                    if let Some(far) = self.left(w) {
                        self.set_color(far, Color::Black);
                    }
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }

    // --- Positions ---

    pub fn first(&self) -> Option<NodeRef> {
        self.first_id().map(|id| self.pool.node_ref(id))
    }

    pub fn last(&self) -> Option<NodeRef> {
        self.last_id().map(|id| self.pool.node_ref(id))
    }

    /// In-order successor of `node`; `None` past the last element or for a stale ref.
    pub fn successor(&self, node: NodeRef) -> Option<NodeRef> {
        let id = self.pool.resolve(node)?;
        self.succ(id).map(|next| self.pool.node_ref(next))
    }

    /// In-order predecessor. `None` stands for the end position, whose predecessor
    /// is the maximum.
    pub fn predecessor(&self, position: Option<NodeRef>) -> Option<NodeRef> {
        let id = match position {
            None => return self.last(),
            Some(node) => self.pool.resolve(node)?,
        };
        self.pred(id).map(|prev| self.pool.node_ref(prev))
    }

    pub fn get(&self, node: NodeRef) -> Option<&V> {
        let id = self.pool.resolve(node)?;
        Some(self.pool.value(id))
    }

    /// Mutable access to a stored value. The key part must not be changed in a way
    /// that alters its ordering.
    pub fn get_mut(&mut self, node: NodeRef) -> Option<&mut V> {
        let id = self.pool.resolve(node)?;
        Some(self.pool.value_mut(id))
    }

    /// Returns `true` if `a` comes strictly before `b` in order.
    ///
    /// Decided structurally from the two root paths, so it also works inside a run
    /// of equal keys.
    fn precedes(&self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        let path_a = self.root_path(a);
        let path_b = self.root_path(b);
        let common = path_a
            .iter()
            .zip(path_b.iter())
            .take_while(|(x, y)| x == y)
            .count();
        match (path_a.get(common), path_b.get(common)) {
            // `a` is an ancestor of `b`.
            (None, Some(&below_b)) => self.right(a) == Some(below_b),
            // `b` is an ancestor of `a`.
            (Some(&below_a), None) => self.left(b) == Some(below_a),
            (Some(&below_a), Some(_)) => self.left(path_a[common - 1]) == Some(below_a),
            (None, None) => false,
        }
    }

    /// Node ids from the root down to `id`.
    fn root_path(&self, id: usize) -> SmallVec<usize, 48> {
        let mut path: SmallVec<usize, 48> = core::iter::successors(Some(id), |&n| self.parent(n)).collect();
        path.reverse();
        path
    }

    // --- Iteration ---

    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.pool, self.first_id(), self.last_id(), self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let head = self.first_id();
        let tail = self.last_id();
        IterMut {
            pool: self.pool.raw(),
            head,
            tail,
            remaining: self.len,
            _marker: PhantomData,
        }
    }

    /// Iterates from `head` up to but excluding `end` (`None` = past the last).
    ///
    /// Yields nothing when `head` is `None`, stale, or does not come before `end`.
    pub fn range(&self, head: Option<NodeRef>, end: Option<NodeRef>) -> Iter<'_, V> {
        let empty = Iter::new(&self.pool, None, None, 0);
        let Some(head) = head.and_then(|node| self.pool.resolve(node)) else {
            return empty;
        };
        let tail = match end {
            None => self.last_id(),
            Some(end) => match self.pool.resolve(end) {
                Some(end) if self.precedes(head, end) => self.pred(end),
                _ => return empty,
            },
        };
        Iter::new(&self.pool, Some(head), tail, self.len)
    }

    fn iter_between(&self, head: Link, end: Link) -> Iter<'_, V> {
        match head {
            Some(h) if Some(h) != end => {
                let tail = match end {
                    None => self.last_id(),
                    Some(e) => self.pred(e),
                };
                Iter::new(&self.pool, Some(h), tail, self.len)
            }
            _ => Iter::new(&self.pool, None, None, 0),
        }
    }
}

impl<V, KoV: KeyOf<V>, C: Compare<KoV::Key>> RbTree<V, KoV, C> {
    /// Inserts `value` unless an equivalent key is present.
    ///
    /// Returns the position of the value with that key and, when the key was already
    /// present, the rejected `value`.
    pub fn insert_unique(&mut self, value: V) -> (NodeRef, Option<V>) {
        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;
        while let Some(id) = cur {
            parent = Some(id);
            match self.compare.compare(KoV::key(&value), KoV::key(self.pool.value(id))) {
                Ordering::Less => {
                    go_left = true;
                    cur = self.left(id);
                }
                Ordering::Greater => {
                    go_left = false;
                    cur = self.right(id);
                }
                Ordering::Equal => return (self.pool.node_ref(id), Some(value)),
            }
        }
        (self.attach(value, parent, go_left), None)
    }

    /// Inserts `value` after every element with an equivalent key.
    pub fn insert_multi(&mut self, value: V) -> NodeRef {
        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;
        while let Some(id) = cur {
            parent = Some(id);
            go_left = self
                .compare
                .less(KoV::key(&value), KoV::key(self.pool.value(id)));
            cur = if go_left { self.left(id) } else { self.right(id) };
        }
        self.attach(value, parent, go_left)
    }

    /// Checks every red-black and ordering invariant, allowing equal keys.
    ///
    /// Returns the black height of the tree (nil leaves count as one).
    pub fn validate(&self) -> Result<usize, TreeViolation> {
        self.check(false)
    }

    /// Like [`validate`](Self::validate) but also rejects equal keys.
    pub fn validate_unique(&self) -> Result<usize, TreeViolation> {
        self.check(true)
    }

    fn check(&self, strict: bool) -> Result<usize, TreeViolation> {
        let Some(root) = self.root else {
            return match self.len {
                0 => Ok(1),
                expected => Err(TreeViolation::SizeMismatch { expected, found: 0 }),
            };
        };
        if self.parent(root).is_some() {
            return Err(TreeViolation::ParentLink { node: root });
        }
        if self.color(root) == Color::Red {
            return Err(TreeViolation::RedRoot);
        }
        let height = self.black_height(Some(root))?;

        let mut found = 0;
        let mut prev: Link = None;
        for id in self.ids() {
            found += 1;
            if let Some(p) = prev {
                let prev_key = KoV::key(self.pool.value(p));
                let key = KoV::key(self.pool.value(id));
                if self.compare.less(key, prev_key) {
                    return Err(TreeViolation::OutOfOrder { node: id });
                }
                if strict && !self.compare.less(prev_key, key) {
                    return Err(TreeViolation::DuplicateKey { node: id });
                }
            }
            prev = Some(id);
        }
        if found != self.len {
            return Err(TreeViolation::SizeMismatch {
                expected: self.len,
                found,
            });
        }
        Ok(height)
    }

    fn black_height(&self, link: Link) -> Result<usize, TreeViolation> {
        let Some(id) = link else { return Ok(1) };
        let links = self.links(id);
        for child in [links.left, links.right].into_iter().flatten() {
            if self.parent(child) != Some(id) {
                return Err(TreeViolation::ParentLink { node: child });
            }
            if links.color == Color::Red && self.color(child) == Color::Red {
                return Err(TreeViolation::RedRed { node: id });
            }
        }
        let left = self.black_height(links.left)?;
        let right = self.black_height(links.right)?;
        if left != right {
            return Err(TreeViolation::BlackHeight { node: id });
        }
        Ok(left + usize::from(links.color == Color::Black))
    }
}

impl<V, KoV: KeyOf<V>, C> RbTree<V, KoV, C> {
    #[inline]
    fn key_as<Q: ?Sized>(&self, id: usize) -> &Q
    where
        KoV::Key: Borrow<Q>,
    {
        <KoV::Key as Borrow<Q>>::borrow(KoV::key(self.pool.value(id)))
    }

    fn lower_bound_id<Q: ?Sized>(&self, key: &Q) -> Link
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        let mut best = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            if self.compare.less(self.key_as(id), key) {
                cur = self.right(id);
            } else {
                best = Some(id);
                cur = self.left(id);
            }
        }
        best
    }

    fn upper_bound_id<Q: ?Sized>(&self, key: &Q) -> Link
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        let mut best = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            if self.compare.less(key, self.key_as(id)) {
                best = Some(id);
                cur = self.left(id);
            } else {
                cur = self.right(id);
            }
        }
        best
    }

    fn find_id<Q: ?Sized>(&self, key: &Q) -> Link
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        self.lower_bound_id(key)
            .filter(|&id| !self.compare.less(key, self.key_as(id)))
    }

    /// Position of the first element equivalent to `key`.
    pub fn find<Q: ?Sized>(&self, key: &Q) -> Option<NodeRef>
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        self.find_id(key).map(|id| self.pool.node_ref(id))
    }

    /// First element whose key is not less than `key`.
    pub fn lower_bound<Q: ?Sized>(&self, key: &Q) -> Option<NodeRef>
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        self.lower_bound_id(key).map(|id| self.pool.node_ref(id))
    }

    /// First element whose key is greater than `key`.
    pub fn upper_bound<Q: ?Sized>(&self, key: &Q) -> Option<NodeRef>
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        self.upper_bound_id(key).map(|id| self.pool.node_ref(id))
    }

    /// All elements equivalent to `key`, in insertion order.
    pub fn equal_range<Q: ?Sized>(&self, key: &Q) -> Iter<'_, V>
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        self.iter_between(self.lower_bound_id(key), self.upper_bound_id(key))
    }

    /// Elements from the first key not less than `low` up to the first key not
    /// less than `high`.
    pub fn key_range<Q: ?Sized>(&self, low: &Q, high: &Q) -> Iter<'_, V>
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        if self.compare.less(high, low) {
            return Iter::new(&self.pool, None, None, 0);
        }
        self.iter_between(self.lower_bound_id(low), self.lower_bound_id(high))
    }

    pub fn count<Q: ?Sized>(&self, key: &Q) -> usize
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        self.equal_range(key).count()
    }

    /// Removes every element equivalent to `key` and returns how many there were.
    pub fn erase_equal<Q: ?Sized>(&mut self, key: &Q) -> usize
    where
        KoV::Key: Borrow<Q>,
        C: Compare<Q>,
    {
        let mut removed = 0;
        while let Some(id) = self.find_id(key) {
            self.unlink(id);
            self.len -= 1;
            drop(self.pool.remove(id));
            removed += 1;
        }
        removed
    }
}

impl<V, KoV, C> Clone for RbTree<V, KoV, C>
where
    V: Clone,
    KoV: KeyOf<V>,
    C: Compare<KoV::Key> + Clone,
{
    fn clone(&self) -> Self {
        let mut out = Self::with_comparator(self.compare.clone());
        for value in self.iter() {
            out.insert_multi(value.clone());
        }
        out
    }
}

impl<V: fmt::Debug, KoV, C> fmt::Debug for RbTree<V, KoV, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// In-order iterator over a tree or a sub-range of it.
///
/// Walks from `head` to `tail` inclusive; the two cursors meet in the middle when
/// iterated from both ends.
pub struct Iter<'a, V> {
    pool: &'a NodePool<V>,
    head: Link,
    tail: Link,
    upper: usize,
}

impl<'a, V> Iter<'a, V> {
    fn new(pool: &'a NodePool<V>, head: Link, tail: Link, upper: usize) -> Self {
        Self {
            pool,
            head,
            tail,
            upper,
        }
    }

    /// Position of the next element to be yielded from the front.
    pub fn peek_node(&self) -> Option<NodeRef> {
        self.head.map(|id| self.pool.node_ref(id))
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        let id = self.head?;
        let pool = self.pool;
        if self.head == self.tail {
            self.head = None;
            self.tail = None;
        } else {
            self.head = successor_with(|i| *pool.links(i), id);
        }
        self.upper = self.upper.saturating_sub(1);
        Some(pool.value(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.head {
            None => (0, Some(0)),
            Some(_) => (1, Some(self.upper)),
        }
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.tail?;
        let pool = self.pool;
        if self.head == self.tail {
            self.head = None;
            self.tail = None;
        } else {
            self.tail = predecessor_with(|i| *pool.links(i), id);
        }
        self.upper = self.upper.saturating_sub(1);
        Some(pool.value(id))
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

/// Mutable in-order iterator. The key part of each value must not be changed in a
/// way that alters its ordering.
pub struct IterMut<'a, V> {
    pool: RawPool<V>,
    head: Link,
    tail: Link,
    remaining: usize,
    _marker: PhantomData<&'a mut V>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        let id = self.head?;
        let pool = self.pool;
        if self.head == self.tail {
            self.head = None;
            self.tail = None;
        } else {
            // Safety: the pool is exclusively borrowed for 'a and `id` is linked.
            self.head = successor_with(|i| unsafe { pool.links(i) }, id);
        }
        self.remaining -= 1;
        // Safety: each linked node is yielded once, the cursors never cross.
        Some(unsafe { pool.value_mut(id) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.tail?;
        let pool = self.pool;
        if self.head == self.tail {
            self.head = None;
            self.tail = None;
        } else {
            // Safety: the pool is exclusively borrowed for 'a and `id` is linked.
            self.tail = predecessor_with(|i| unsafe { pool.links(i) }, id);
        }
        self.remaining -= 1;
        // Safety: each linked node is yielded once, the cursors never cross.
        Some(unsafe { pool.value_mut(id) })
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// Owning in-order iterator.
pub struct IntoIter<V> {
    pool: NodePool<V>,
    ids: array::IntoIter<usize>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.ids.next().map(|id| self.pool.remove(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<V> {
        self.ids.next_back().map(|id| self.pool.remove(id))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

impl<V, KoV, C> IntoIterator for RbTree<V, KoV, C> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        let mut ids = DynArray::with_capacity(self.len);
        ids.extend(self.ids());
        let RbTree { pool, .. } = self;
        IntoIter {
            pool,
            ids: ids.into_iter(),
        }
    }
}

impl<'a, V, KoV, C> IntoIterator for &'a RbTree<V, KoV, C> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::slab::SLAB_SIZE;

    type Set = RbTree<i32, Identity>;
    type Multi = RbTree<(i32, &'static str), First>;

    fn values(tree: &Set) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn test_rb_tree_insert_keeps_invariants() {
        let mut tree = Set::new();
        for i in 0..1000 {
            let (_, rejected) = tree.insert_unique((i * 7919) % 1000);
            assert_eq!(rejected, None);
            if i % 97 == 0 {
                tree.validate_unique().unwrap();
            }
        }
        let height = tree.validate_unique().unwrap();
        assert!(height <= 11, "black height {height}");
        assert_eq!(values(&tree), (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn test_rb_tree_insert_unique_rejects_duplicates() {
        let mut tree = Set::new();
        let (first, _) = tree.insert_unique(5);
        let (again, rejected) = tree.insert_unique(5);
        assert_eq!(first, again);
        assert_eq!(rejected, Some(5));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_rb_tree_erase_keeps_invariants() {
        let mut tree = Set::new();
        for i in 0..512 {
            tree.insert_unique(i);
        }
        for i in (0..512).step_by(3) {
            let node = tree.find(&i).unwrap();
            let (value, next) = tree.erase(node).unwrap();
            assert_eq!(value, i);
            assert_eq!(next.and_then(|n| tree.get(n)).copied(), (i + 1 < 512).then_some(i + 1));
            tree.validate_unique().unwrap();
        }
        assert_eq!(tree.len(), 512 - 171);
        assert!(tree.find(&3).is_none());
        assert!(tree.find(&4).is_some());
    }

    #[test]
    fn test_rb_tree_erase_interior_keeps_other_refs() {
        let mut tree = Set::new();
        let refs: Vec<NodeRef> = (0..50).map(|i| tree.insert_unique(i).0).collect();
        let doomed = [25, 10, 40, 3, 31];
        for &i in &doomed {
            let (value, _) = tree.erase(refs[i]).unwrap();
            assert_eq!(value, i as i32);
            tree.validate_unique().unwrap();
        }
        for (i, node) in refs.iter().enumerate() {
            if doomed.contains(&i) {
                assert_eq!(tree.get(*node), None);
            } else {
                assert_eq!(tree.get(*node), Some(&(i as i32)));
            }
        }
    }

    #[test]
    fn test_rb_tree_stale_ref_after_slot_reuse() {
        let mut tree = Set::new();
        let (node, _) = tree.insert_unique(1);
        tree.erase(node).unwrap();
        assert!(tree.is_empty());
        let (reused, _) = tree.insert_unique(2);
        assert_ne!(node, reused);
        assert_eq!(tree.get(node), None);
        assert!(tree.erase(node).is_none());
        assert_eq!(tree.successor(node), None);
    }

    #[test]
    fn test_rb_tree_multi_runs_keep_insertion_order() {
        let mut tree = Multi::new();
        let labels = ["a", "b", "c", "d", "e", "f"];
        for (i, &label) in labels.iter().enumerate() {
            tree.insert_multi((1, label));
            tree.insert_multi((i as i32 * 2, "x"));
        }
        tree.validate().unwrap();
        let run: Vec<&str> = tree.equal_range(&1).map(|(_, l)| *l).collect();
        assert_eq!(run, labels);
        assert_eq!(tree.count(&1), 6);
        assert_eq!(tree.count(&0), 1);
        assert_eq!(tree.count(&3), 0);
        assert!(tree.validate_unique().is_err());
    }

    #[test]
    fn test_rb_tree_erase_equal_removes_run() {
        let mut tree = Multi::new();
        for i in 0..20 {
            tree.insert_multi((i % 4, "v"));
        }
        assert_eq!(tree.erase_equal(&2), 5);
        assert_eq!(tree.erase_equal(&2), 0);
        assert_eq!(tree.len(), 15);
        tree.validate().unwrap();
    }

    #[test]
    fn test_rb_tree_bounds() {
        let mut tree = Set::new();
        for i in [10, 20, 30, 40] {
            tree.insert_unique(i);
        }
        let at = |n: Option<NodeRef>| n.and_then(|n| tree.get(n)).copied();
        assert_eq!(at(tree.lower_bound(&20)), Some(20));
        assert_eq!(at(tree.lower_bound(&21)), Some(30));
        assert_eq!(at(tree.upper_bound(&20)), Some(30));
        assert_eq!(at(tree.upper_bound(&40)), None);
        assert_eq!(at(tree.find(&25)), None);
        assert_eq!(at(tree.first()), Some(10));
        assert_eq!(at(tree.last()), Some(40));
        assert_eq!(at(tree.predecessor(None)), Some(40));
        assert_eq!(at(tree.predecessor(tree.first())), None);
        assert_eq!(
            tree.key_range(&15, &35).copied().collect::<Vec<_>>(),
            vec![20, 30]
        );
        assert_eq!(tree.key_range(&35, &15).count(), 0);
    }

    #[test]
    fn test_rb_tree_range_between_positions() {
        let mut tree = Multi::new();
        for (k, l) in [(1, "a"), (2, "b"), (2, "c"), (2, "d"), (3, "e")] {
            tree.insert_multi((k, l));
        }
        let b = tree.find(&2).unwrap();
        let d = tree.predecessor(tree.find(&3)).unwrap();
        let forward: Vec<&str> = tree.range(Some(b), Some(d)).map(|(_, l)| *l).collect();
        assert_eq!(forward, vec!["b", "c"]);
        assert_eq!(tree.range(Some(d), Some(b)).count(), 0);
        assert_eq!(tree.range(Some(b), Some(b)).count(), 0);
        let tail: Vec<&str> = tree.range(Some(d), None).map(|(_, l)| *l).collect();
        assert_eq!(tail, vec!["d", "e"]);
    }

    #[test]
    fn test_rb_tree_iterators_both_ends() {
        let mut tree = Set::new();
        for i in [5, 1, 4, 2, 3] {
            tree.insert_unique(i);
        }
        assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
        let mut iter = tree.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next_back(), None);

        let mut pairs: RbTree<(i32, i32), First> = RbTree::new();
        for i in 0..10 {
            pairs.insert_unique((i, 0));
        }
        for (k, v) in pairs.iter_mut() {
            *v = *k * 10;
        }
        assert_eq!(pairs.iter().map(|p| p.1).sum::<i32>(), 450);
        assert_eq!(pairs.into_iter().rev().next(), Some((9, 90)));
    }

    #[test]
    fn test_rb_tree_clear_keeps_slabs() {
        let mut tree = Set::new();
        for i in 0..(SLAB_SIZE as i32 + 1) {
            tree.insert_unique(i);
        }
        assert_eq!(tree.slab_capacity(), 2 * SLAB_SIZE);
        let node = tree.first().unwrap();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.slab_capacity(), 2 * SLAB_SIZE);
        assert_eq!(tree.get(node), None);
        tree.insert_unique(7);
        assert_eq!(values(&tree), vec![7]);
        tree.validate_unique().unwrap();
    }

    #[test]
    fn test_rb_tree_custom_comparator_and_clone() {
        let mut tree: RbTree<i32, Identity, _> = RbTree::with_comparator(|a: &i32, b: &i32| a > b);
        for i in 0..10 {
            tree.insert_unique(i);
        }
        let copy = tree.clone();
        tree.erase(tree.first().unwrap());
        assert_eq!(copy.iter().copied().next(), Some(9));
        assert_eq!(tree.iter().copied().next(), Some(8));
        copy.validate_unique().unwrap();
    }

    #[test]
    fn test_rb_tree_drops_every_value() {
        use std::rc::Rc;
        let marker = Rc::new(());
        {
            let mut tree: RbTree<(i32, Rc<()>), First> = RbTree::new();
            for i in 0..100 {
                tree.insert_unique((i, marker.clone()));
            }
            tree.erase_equal(&50);
            let mut iter = tree.into_iter();
            iter.next();
            assert_eq!(Rc::strong_count(&marker), 99);
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }
}
