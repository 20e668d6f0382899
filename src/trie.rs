//! Byte-wise prefix tree.
//!
//! Each node keeps its children in a [`SmallVec`] sorted by edge byte, so the common
//! case of a few branches per node never allocates a child table.

use core::fmt;

use crate::vecs::small_vec::SmallVec;

#[derive(Clone, Default)]
struct Node {
    terminal: bool,
    children: SmallVec<(u8, Box<Node>), 4>,
}

impl Node {
    fn child(&self, byte: u8) -> Option<&Node> {
        let index = self.children.binary_search_by_key(&byte, |(b, _)| *b).ok()?;
        Some(&self.children[index].1)
    }

    fn child_or_insert(&mut self, byte: u8) -> &mut Node {
        let index = match self.children.binary_search_by_key(&byte, |(b, _)| *b) {
            Ok(index) => index,
            Err(index) => {
                self.children
                    .insert(index, (byte, Box::default()))
                    .expect("binary search returns an index within bounds");
                index
            }
        };
        &mut self.children[index].1
    }

    fn is_dead(&self) -> bool {
        !self.terminal && self.children.is_empty()
    }

    fn walk(&self, word: &[u8]) -> Option<&Node> {
        word.iter().try_fold(self, |node, &byte| node.child(byte))
    }

    fn collect(&self, prefix: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
        if self.terminal {
            out.push(prefix.clone());
        }
        for (byte, child) in self.children.iter() {
            prefix.push(*byte);
            child.collect(prefix, out);
            prefix.pop();
        }
    }
}

/// Returns whether `word` was present. Nodes left with no word and no children are
/// unlinked on the way back up.
fn remove_from(node: &mut Node, word: &[u8]) -> bool {
    let Some((&byte, rest)) = word.split_first() else {
        return core::mem::replace(&mut node.terminal, false);
    };
    let Ok(index) = node.children.binary_search_by_key(&byte, |(b, _)| *b) else {
        return false;
    };
    let removed = remove_from(&mut node.children[index].1, rest);
    if removed && node.children[index].1.is_dead() {
        let _ = node.children.remove(index);
    }
    removed
}

/// A set of byte strings supporting prefix queries.
#[derive(Clone, Default)]
pub struct Trie {
    root: Node,
    len: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored words.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = Node::default();
        self.len = 0;
    }

    /// Returns `false` if `word` was already stored.
    pub fn insert(&mut self, word: impl AsRef<[u8]>) -> bool {
        let node = word
            .as_ref()
            .iter()
            .fold(&mut self.root, |node, &byte| node.child_or_insert(byte));
        if node.terminal {
            return false;
        }
        node.terminal = true;
        self.len += 1;
        true
    }

    pub fn contains(&self, word: impl AsRef<[u8]>) -> bool {
        self.root.walk(word.as_ref()).is_some_and(|node| node.terminal)
    }

    /// Whether any stored word begins with `prefix`. The empty prefix matches only a
    /// non-empty trie.
    pub fn starts_with(&self, prefix: impl AsRef<[u8]>) -> bool {
        match self.root.walk(prefix.as_ref()) {
            Some(node) => !node.is_dead(),
            None => false,
        }
    }

    /// Removes `word` and prunes branches that no longer lead to a word.
    pub fn remove(&mut self, word: impl AsRef<[u8]>) -> bool {
        let removed = remove_from(&mut self.root, word.as_ref());
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Every stored word beginning with `prefix`, in byte order.
    pub fn words_with_prefix(&self, prefix: impl AsRef<[u8]>) -> Vec<Vec<u8>> {
        let prefix = prefix.as_ref();
        let mut out = Vec::new();
        if let Some(node) = self.root.walk(prefix) {
            node.collect(&mut prefix.to_vec(), &mut out);
        }
        out
    }

    /// Every stored word in byte order.
    pub fn words(&self) -> Vec<Vec<u8>> {
        self.words_with_prefix(b"")
    }
}

impl fmt::Debug for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.words().iter().map(|w| String::from_utf8_lossy(w)))
            .finish()
    }
}

impl<W: AsRef<[u8]>> Extend<W> for Trie {
    fn extend<I: IntoIterator<Item = W>>(&mut self, iter: I) {
        for word in iter {
            self.insert(word);
        }
    }
}

impl<W: AsRef<[u8]>> FromIterator<W> for Trie {
    fn from_iter<I: IntoIterator<Item = W>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}
