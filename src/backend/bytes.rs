//! Byte Backend
//!
//! Raw byte storage for front-ends that serialize their own values. The
//! backend never looks inside a value.

use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{Getter, Store};
use crate::cache::{CacheStats, MemLru};
use crate::config::CacheConfig;
use crate::context::Context;
use crate::error::Result;

// == Mem Backend ==
/// In-memory byte backend.
#[derive(Debug)]
pub struct MemBackend {
    cache: MemLru<Vec<u8>>,
}

impl MemBackend {
    /// Creates a backend holding at most `capacity` values with no default
    /// expiry.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_config(CacheConfig::new(capacity))
    }

    pub fn with_config(config: CacheConfig) -> Result<Self> {
        Ok(Self {
            cache: MemLru::with_config(config)?,
        })
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Stops the expiry sweeper.
    pub fn close(&self) {
        self.cache.close();
    }
}

#[async_trait]
impl Store<Vec<u8>> for MemBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.cache.set(key, value).await;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.cache.set_ex(key, value, ttl).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.delete(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.cache.exists(key).await)
    }

    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        Ok(self.cache.batch_get(keys).await)
    }

    async fn batch_set(&self, keys: &[String], values: Vec<Vec<u8>>) -> Result<()> {
        self.cache.batch_set(keys, values).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        self.cache.delete_prefix(prefix).await;
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.cache.clear_all().await;
        Ok(())
    }

    async fn get_or_set_with_lock(
        &self,
        ctx: &Context,
        key: &str,
        getter: Getter<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        self.cache.get_or_set_with_lock(ctx, key, getter).await
    }
}
