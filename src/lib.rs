//! Cachestore Mem - A bounded in-process cache backend
//!
//! Holds recently used values under a fixed capacity with LRU eviction,
//! expires entries after a TTL, and loads missing keys at most once across
//! concurrent callers.

pub mod backend;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod tasks;

pub use backend::{getter, Getter, MemBackend, Store};
pub use cache::{CacheStats, MemLru};
pub use config::CacheConfig;
pub use context::Context;
pub use error::{CacheError, Result};
