//! Hashing engine shared by the unordered containers.

pub mod hash_table;

pub use hash_table::{DEFAULT_BUCKET_COUNT, DEFAULT_MAX_LOAD_FACTOR, HashTable};
