//! Backend Module
//!
//! The store contract consumed by cache front-ends, implemented for the
//! typed in-memory cache and for the raw byte backend.
//!
//! # Operations
//! - `get` / `set` / `set_ex` / `delete` / `exists` - single keys
//! - `batch_get` / `batch_set` - ordered, per-position batches
//! - `delete_prefix` / `clear_all` - maintenance
//! - `get_or_set_with_lock` - single-flight loading

mod bytes;

use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::cache::MemLru;
use crate::context::Context;
use crate::error::Result;

pub use bytes::MemBackend;

/// A value producer for `get_or_set_with_lock`, boxed so it can cross the
/// object-safe [`Store`] trait.
pub type Getter<V> =
    Box<dyn FnOnce(Context, String) -> BoxFuture<'static, anyhow::Result<V>> + Send + 'static>;

/// Boxes a closure into a [`Getter`].
pub fn getter<V, F, Fut>(f: F) -> Getter<V>
where
    F: FnOnce(Context, String) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = anyhow::Result<V>> + Send + 'static,
{
    Box::new(move |ctx, key| Box::pin(f(ctx, key)))
}

// == Store Contract ==
/// Key-value cache operations. Absence is never an error: lookups report
/// it as `None` or `false`.
#[async_trait]
pub trait Store<V>: Send + Sync {
    /// Returns the live value for `key`.
    async fn get(&self, key: &str) -> Result<Option<V>>;

    /// Stores `value` under the default key expiry.
    async fn set(&self, key: &str, value: V) -> Result<()>;

    /// Stores `value` expiring after `ttl`; a zero TTL never expires.
    async fn set_ex(&self, key: &str, value: V, ttl: Duration) -> Result<()>;

    /// Removes `key`; succeeds whether or not it was present.
    async fn delete(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// One slot per input key, in input order.
    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<V>>>;

    /// `keys` and `values` must have the same length.
    async fn batch_set(&self, keys: &[String], values: Vec<V>) -> Result<()>;

    /// Removes every key starting with `prefix`; no match is not an error.
    async fn delete_prefix(&self, prefix: &str) -> Result<()>;

    async fn clear_all(&self) -> Result<()>;

    /// Returns the cached value or loads it once for all concurrent callers.
    async fn get_or_set_with_lock(&self, ctx: &Context, key: &str, getter: Getter<V>) -> Result<V>;
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> Store<V> for MemLru<V> {
    async fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(MemLru::get(self, key).await)
    }

    async fn set(&self, key: &str, value: V) -> Result<()> {
        MemLru::set(self, key, value).await;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        MemLru::set_ex(self, key, value, ttl).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        MemLru::delete(self, key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(MemLru::exists(self, key).await)
    }

    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<V>>> {
        Ok(MemLru::batch_get(self, keys).await)
    }

    async fn batch_set(&self, keys: &[String], values: Vec<V>) -> Result<()> {
        MemLru::batch_set(self, keys, values).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        MemLru::delete_prefix(self, prefix).await;
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        MemLru::clear_all(self).await;
        Ok(())
    }

    async fn get_or_set_with_lock(&self, ctx: &Context, key: &str, getter: Getter<V>) -> Result<V> {
        MemLru::get_or_set_with_lock(self, ctx, key, getter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn typed_store() -> Arc<dyn Store<String>> {
        Arc::new(MemLru::with_capacity(16).unwrap())
    }

    #[tokio::test]
    async fn test_store_trait_roundtrip() {
        let store = typed_store().await;

        store.set("key", "value".to_string()).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some("value".to_string()));
        assert!(store.exists("key").await.unwrap());

        store.delete("key").await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), None);
        // Deleting again still succeeds
        store.delete("key").await.unwrap();
    }

    #[tokio::test]
    async fn test_store_trait_batches_and_prefix() {
        let store = typed_store().await;
        let keys: Vec<String> = vec!["key1".into(), "key2".into(), "key3".into()];
        let values: Vec<String> = vec!["value1".into(), "value2".into(), "value3".into()];

        store.batch_set(&keys, values.clone()).await.unwrap();
        let batch = store.batch_get(&keys).await.unwrap();
        assert_eq!(batch, values.into_iter().map(Some).collect::<Vec<_>>());

        store.delete_prefix("key").await.unwrap();
        assert_eq!(store.batch_get(&keys).await.unwrap(), vec![None, None, None]);
    }

    #[tokio::test]
    async fn test_store_trait_get_or_set_with_lock() {
        let store = typed_store().await;

        let value = store
            .get_or_set_with_lock(
                &Context::background(),
                "k",
                getter(|_, key| async move { anyhow::Ok(format!("result:{key}")) }),
            )
            .await
            .unwrap();

        assert_eq!(value, "result:k");
        assert_eq!(store.get("k").await.unwrap(), Some("result:k".to_string()));
    }

    #[tokio::test]
    async fn test_store_trait_clear_all() {
        let store = typed_store().await;
        store.set("a", "1".to_string()).await.unwrap();

        store.clear_all().await.unwrap();

        assert!(!store.exists("a").await.unwrap());
    }
}
