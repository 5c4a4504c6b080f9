//! In-Memory LRU Cache
//!
//! Thread-safe cache instance tying together the entry store, the
//! single-flight table and the expiry sweeper.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::flight::{Flight, InFlightTable};
use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::context::Context;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, Sweep, SweeperHandle};

/// Everything guarded by the cache's single lock.
struct State<V> {
    store: CacheStore<V>,
    in_flight: InFlightTable<V>,
}

struct Inner<V> {
    state: RwLock<State<V>>,
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> Sweep for Inner<V> {
    async fn sweep_expired(&self) -> usize {
        self.state.write().await.store.cleanup_expired()
    }
}

// == MemLru ==
/// A bounded in-memory cache with LRU eviction, TTL expiry and
/// single-flight loading.
///
/// Values are stored as-is; `V` is cloned out on reads. The expiry sweeper
/// runs until [`MemLru::close`] is called or the cache is dropped.
pub struct MemLru<V> {
    inner: Arc<Inner<V>>,
    config: CacheConfig,
    sweeper: SweeperHandle,
}

impl<V> std::fmt::Debug for MemLru<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemLru")
            .field("config", &self.config)
            .field("closed", &self.sweeper.is_stopped())
            .finish_non_exhaustive()
    }
}

impl<V: Clone + Send + Sync + 'static> MemLru<V> {
    // == Constructors ==
    /// Creates a cache with the default capacity and no default expiry.
    pub fn new() -> Result<Self> {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(CacheConfig::new(capacity))
    }

    /// Creates a cache from a full configuration.
    ///
    /// Fails on an invalid configuration, or when called outside a tokio
    /// runtime since the expiry sweeper could not be started.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::NoRuntime);
        }

        let inner = Arc::new(Inner {
            state: RwLock::new(State {
                store: CacheStore::new(config.capacity, config.default_key_expiry),
                in_flight: InFlightTable::new(),
            }),
        });
        let sweeper = spawn_sweeper(Arc::downgrade(&inner), config.sweep_interval);

        info!(
            capacity = config.capacity,
            default_key_expiry_ms = config.default_key_expiry.map(|d| d.as_millis() as u64),
            sweep_interval_ms = config.sweep_interval.as_millis() as u64,
            "Memory cache initialized"
        );

        Ok(Self {
            inner,
            config,
            sweeper,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Single-key Operations ==
    /// Returns the live value for `key`, promoting it to most recently used.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.state.write().await.store.get(key)
    }

    /// Stores `value` under the cache's default key expiry.
    pub async fn set(&self, key: &str, value: V) {
        self.inner.state.write().await.store.set(key, value);
    }

    /// Stores `value` expiring after `ttl`. A zero TTL never expires,
    /// regardless of the default key expiry.
    pub async fn set_ex(&self, key: &str, value: V, ttl: Duration) {
        self.inner.state.write().await.store.set_ex(key, value, ttl);
    }

    /// Removes `key`. Returns whether it was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.inner.state.write().await.store.remove(key).is_some()
    }

    /// Checks for a live entry without promoting it.
    pub async fn exists(&self, key: &str) -> bool {
        self.inner.state.write().await.store.contains(key)
    }

    // == Batch Operations ==
    /// Looks up every key under one lock acquisition. The result has one
    /// slot per input key, in input order.
    pub async fn batch_get(&self, keys: &[String]) -> Vec<Option<V>> {
        let mut state = self.inner.state.write().await;
        keys.iter().map(|key| state.store.get(key)).collect()
    }

    /// Stores each pair under the default key expiry.
    pub async fn batch_set(&self, keys: &[String], values: Vec<V>) -> Result<()> {
        if keys.len() != values.len() {
            return Err(CacheError::InvalidRequest(format!(
                "batch set got {} keys and {} values",
                keys.len(),
                values.len()
            )));
        }

        let mut state = self.inner.state.write().await;
        for (key, value) in keys.iter().zip(values) {
            state.store.set(key, value);
        }
        Ok(())
    }

    /// Removes every key starting with `prefix`, returning how many were
    /// removed.
    pub async fn delete_prefix(&self, prefix: &str) -> usize {
        let removed = self.inner.state.write().await.store.remove_prefix(prefix);
        debug!(prefix, removed, "Deleted keys by prefix");
        removed
    }

    /// Drops every entry. Loads already in flight still complete and store
    /// their result.
    pub async fn clear_all(&self) {
        self.inner.state.write().await.store.clear();
    }

    // == Get Or Set With Lock ==
    /// Returns the cached value for `key`, or loads it with `getter`.
    ///
    /// Concurrent callers missing on the same key share one getter run and
    /// all receive its outcome. A successful result is stored under the
    /// default key expiry; a failure is returned to every caller and nothing
    /// is stored.
    ///
    /// The getter runs on its own task with the owning caller's context, so
    /// it completes even if that caller stops waiting. Each caller returns
    /// its own context error if its context finishes first.
    pub async fn get_or_set_with_lock<F, Fut>(&self, ctx: &Context, key: &str, getter: F) -> Result<V>
    where
        F: FnOnce(Context, String) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let waiter = {
            let mut state = self.inner.state.write().await;
            if let Some(value) = state.store.get(key) {
                return Ok(value);
            }

            match state.in_flight.join(key) {
                Flight::Follower(waiter) => waiter,
                Flight::Owner(request, waiter) => {
                    debug!(key, "Loading missing key");
                    let inner = Arc::clone(&self.inner);
                    let getter_ctx = ctx.clone();
                    let key = key.to_string();

                    tokio::spawn(async move {
                        let load_key = key.clone();
                        let load = AssertUnwindSafe(async move { getter(getter_ctx, load_key).await });
                        let outcome = match load.catch_unwind().await {
                            Ok(Ok(value)) => Ok(value),
                            Ok(Err(err)) => Err(CacheError::from(err)),
                            Err(_) => {
                                warn!(key = %key, "Getter panicked");
                                Err(CacheError::Aborted(key.clone()))
                            }
                        };

                        let mut state = inner.state.write().await;
                        if let Ok(value) = &outcome {
                            state.store.set(&key, value.clone());
                        }
                        state.in_flight.finish(&key, request, outcome);
                    });
                    waiter
                }
            }
        };

        waiter.wait(ctx).await
    }

    // == Introspection ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.inner.state.read().await.store.stats()
    }

    /// Number of stored entries, including expired entries not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.state.read().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Runs an expiry sweep now, returning how many entries were removed.
    pub async fn sweep_expired(&self) -> usize {
        self.inner.sweep_expired().await
    }

    // == Teardown ==
    /// Stops the expiry sweeper. The cache remains usable; expired entries
    /// are then only removed lazily on access.
    pub fn close(&self) {
        if !self.sweeper.is_stopped() {
            self.sweeper.stop();
            info!("Memory cache closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sweeper.is_stopped()
    }
}
