pub mod lru_cache;

#[cfg(feature = "lru")]
pub use lru_cache::{AnyLruCache, LruCache};
