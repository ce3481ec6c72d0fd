//! Bounded in-process caching primitives.

pub mod lru;

pub use lru::LruCache;
