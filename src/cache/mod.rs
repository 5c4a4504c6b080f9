//! Cache Module
//!
//! Provides bounded in-memory caching with TTL expiration, LRU eviction and
//! single-flight loading of missing keys.

mod entry;
mod flight;
mod lru;
mod memlru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use flight::{Flight, InFlightRequest, InFlightTable, Waiter};
pub use lru::{LruTracker, NodeId};
pub use memlru::MemLru;
pub use stats::CacheStats;
pub use store::CacheStore;
