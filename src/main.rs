//! Cachestore Mem - demo walkthrough
//!
//! Drives a byte backend through a small JSON-serializing front-end:
//! fills it, waits for the default expiry to pass, and clears it by prefix.

use std::marker::PhantomData;
use std::time::Duration;

use anyhow::{ensure, Context as _};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachestore_mem::{CacheConfig, MemBackend, Store};

/// Typed view over a byte store, encoding values as JSON.
struct JsonStore<T> {
    backend: MemBackend,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> JsonStore<T> {
    fn open(backend: MemBackend) -> Self {
        Self {
            backend,
            _marker: PhantomData,
        }
    }

    async fn set(&self, key: &str, value: &T) -> anyhow::Result<()> {
        self.backend.set(key, serde_json::to_vec(value)?).await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()> {
        self.backend.set_ex(key, serde_json::to_vec(value)?, ttl).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.backend.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> anyhow::Result<()> {
        self.backend.delete_prefix(prefix).await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachestore_mem=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The walkthrough relies on a 1s default expiry; only the sweep
    // interval is taken from the environment.
    let sweep_interval = CacheConfig::from_env()
        .context("loading cache configuration")?
        .sweep_interval;
    let config = CacheConfig::new(200)
        .with_default_key_expiry(Duration::from_secs(1))
        .with_sweep_interval(sweep_interval);

    let store = JsonStore::<String>::open(MemBackend::with_config(config)?);

    for i in 0..100 {
        store.set(&format!("foo:{i}"), &format!("value-{i}")).await?;
    }
    store
        .set_ex("foo:999", &"value-999".to_string(), Duration::from_secs(600))
        .await?;

    let value = store.get("foo:10").await?;
    ensure!(value.is_some(), "foo:10 should be cached");
    info!(?value, "get(foo:10)");

    tokio::time::sleep(sweep_interval).await;

    let value = store.get("foo:10").await?;
    ensure!(value.is_none(), "foo:10 should have expired");
    info!(?value, "get(foo:10) after default expiry");

    let value = store.get("foo:999").await?;
    ensure!(value.is_some(), "foo:999 should outlive the default expiry");
    info!(?value, "get(foo:999)");

    store.delete_prefix("foo").await?;
    ensure!(
        store.get("foo:999").await?.is_none(),
        "foo:999 should be gone after prefix delete"
    );

    info!(stats = ?store.backend.stats().await, "Done");
    Ok(())
}
