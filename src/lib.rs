//! # Bedrock Collections
//!
//! Generic containers built from first principles: ordered maps and sets on a
//! slab-allocated red-black tree, unordered maps and sets on a bucketed hash table
//! with forward-list chaining, and a vector family (`DynArray`, `Deque`, `SmallVec`,
//! `StableVec`, `SmallString`) sharing one growth policy.
//!
//! ## Key Features
//!
//! * **Ordered containers:** `TreeMap`, `TreeSet` and their multi variants keep keys
//!   sorted under any [`Compare`] strategy, with `lower_bound`, `upper_bound` and
//!   `range` queries in O(log n).
//! * **Unordered containers:** `UnorderedMap`, `UnorderedSet` and their multi
//!   variants expose the bucket layout (`bucket_count`, `load_factor`,
//!   `max_load_factor`, `rehash`, `reserve`). Hashing defaults to `FnvBuildHasher`.
//! * **Small-buffer vector:** `SmallVec<T, N>` keeps up to `N` elements inline and
//!   promotes to the heap once, never moving back.
//! * **Short strings:** `SmallString<N>` is a UTF-8 string on top of `SmallVec<u8, N>`.
//! * **Stable addresses:** `StableVec<T>` never relocates an element while it lives.
//! * **Checked access:** fallible accessors return [`CollectionError`] through the
//!   crate's [`Result`] alias; `Option` accessors are there for plain absence.
//! * **Interoperability:** every set implements [`AnySet`], so a `TreeSet` compares
//!   equal to an `UnorderedSet` or a `std::collections::HashSet` with the same
//!   elements. Heaps implement [`AnyHeap`] alongside `std::collections::BinaryHeap`.
//!
//! ## Cargo Features
//!
//! * `lru` (default): the [`LruCache`], composed from [`List`] and [`UnorderedMap`].
//!
//! ## Examples
//!
//! ### TreeMap
//!
//! ```rust
//! use bedrock_collections::TreeMap;
//!
//! let mut map = TreeMap::new();
//! map.insert(3, "three");
//! map.insert(1, "one");
//! map.insert(2, "two");
//!
//! assert_eq!(map.insert(2, "deux"), Some("two"));
//! assert_eq!(map.first_key_value(), Some((&1, &"one")));
//!
//! let middle: Vec<i32> = map.range(&2, &10).map(|(k, _)| *k).collect();
//! assert_eq!(middle, vec![2, 3]);
//! ```
//!
//! ### UnorderedMap
//!
//! ```rust
//! use bedrock_collections::{CollectionError, UnorderedMap};
//!
//! let mut map: UnorderedMap<String, u32> = UnorderedMap::new();
//! assert_eq!(map.bucket_count(), 16);
//!
//! for word in "the quick brown fox jumps over the lazy dog".split(' ') {
//!     *map.get_or_default(word.to_string()) += 1;
//! }
//!
//! assert_eq!(map.get("the"), Some(&2));
//! assert_eq!(map.at("cat"), Err(CollectionError::NotFound));
//! assert!(map.load_factor() <= map.max_load_factor());
//! ```
//!
//! ### SmallVec
//!
//! ```rust
//! use bedrock_collections::SmallVec;
//!
//! let mut v: SmallVec<u8, 4> = SmallVec::new();
//! v.extend([1, 2, 3, 4]);
//! assert!(v.using_inline_storage());
//!
//! // Fifth push promotes to the heap
//! v.push(5);
//! assert!(!v.using_inline_storage());
//! assert_eq!(&v[..], &[1, 2, 3, 4, 5]);
//! ```

// --- Module Declarations ---

pub mod adapters;
pub mod cache;
pub mod error;
pub mod hash;
pub mod heap;
pub mod lists;
pub mod maps;
pub mod sets;
pub mod string;
pub mod tree;
pub mod trie;
pub mod utils;
pub mod vecs;

// --- Re-exports ---

pub use adapters::{Queue, Stack};
#[cfg(feature = "lru")]
pub use cache::{AnyLruCache, LruCache};
pub use error::{CollectionError, Result};
pub use hash::HashTable;
pub use heap::{AnyHeap, DaryHeap, MaxHeap, heap_sort, heap_sort_by};
pub use lists::forward_list::ForwardList;
pub use lists::list::{List, ListHandle};
pub use maps::{FlatMap, TreeMap, TreeMultiMap, UnorderedMap, UnorderedMultiMap};
pub use sets::{AnySet, FlatSet, TreeMultiSet, TreeSet, UnorderedMultiSet, UnorderedSet};
pub use string::SmallString;
pub use tree::{NodeRef, RbTree};
pub use trie::Trie;
pub use utils::compare::{Compare, NaturalOrder, ReverseOrder};
pub use vecs::array::DynArray;
pub use vecs::deque::Deque;
pub use vecs::ring_buffer::RingBuffer;
pub use vecs::small_vec::{AnyVec, SmallVec};
pub use vecs::stable_vec::StableVec;
