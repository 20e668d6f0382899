//! Map adapters over the tree, the hash table and a sorted array.

pub mod flat_map;
pub mod tree_map;
pub mod tree_multimap;
pub mod unordered_map;
pub mod unordered_multimap;

pub use flat_map::FlatMap;
pub use tree_map::TreeMap;
pub use tree_multimap::TreeMultiMap;
pub use unordered_map::UnorderedMap;
pub use unordered_multimap::UnorderedMultiMap;
