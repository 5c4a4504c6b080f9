//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

use crate::cache::lru::NodeId;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiry instant, None = no expiration
    pub expires_at: Option<Instant>,
    /// Handle of this entry's node in the recency index
    pub(crate) node: NodeId,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, expires_at: Option<Instant>, node: NodeId) -> Self {
        Self {
            value,
            expires_at,
            node,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now` reaches its expiry instant, so a TTL
    /// that has fully elapsed hides the entry immediately.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

/// Converts a TTL into an absolute expiry instant. A zero TTL never expires,
/// and neither does a TTL too large to be represented as an instant.
pub fn expiry_from_ttl(ttl: Option<Duration>) -> Option<Instant> {
    ttl.filter(|d| !d.is_zero())
        .and_then(|d| Instant::now().checked_add(d))
}
