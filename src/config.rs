//! Configuration Module
//!
//! Construction parameters for a cache instance, loadable from environment
//! variables or embedded in a host's config file.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{CacheError, Result};

// == Defaults ==
/// Capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 512;

/// Interval between background expiry sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Cache construction parameters.
///
/// Durations are expressed in whole seconds when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub capacity: usize,
    /// Expiry applied by `set` when no explicit TTL is given
    #[serde(rename = "default_key_expiry_secs", deserialize_with = "opt_secs")]
    pub default_key_expiry: Option<Duration>,
    /// Interval between background expiry sweeps
    #[serde(rename = "sweep_interval_secs", deserialize_with = "secs")]
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the given capacity and default everything else.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the default key expiry. A zero duration means entries never
    /// expire unless given an explicit TTL.
    pub fn with_default_key_expiry(mut self, expiry: Duration) -> Self {
        self.default_key_expiry = Some(expiry).filter(|d| !d.is_zero());
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    // == Validate ==
    /// Rejects a zero capacity or a zero sweep interval.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::Config(
                "capacity must be a positive integer".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::Config(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum live entries (default: 512)
    /// - `CACHE_DEFAULT_KEY_EXPIRY_SECS` - Default TTL in seconds, 0 = none (default: 0)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 5)
    ///
    /// Unparseable values are reported as configuration errors rather than
    /// silently replaced by defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let capacity = env_var("CACHE_CAPACITY")?.unwrap_or(defaults.capacity as u64) as usize;
        let expiry = env_var("CACHE_DEFAULT_KEY_EXPIRY_SECS")?.unwrap_or(0);
        let sweep = env_var("CACHE_SWEEP_INTERVAL_SECS")?
            .unwrap_or(defaults.sweep_interval.as_secs());

        let config = Self::new(capacity)
            .with_default_key_expiry(Duration::from_secs(expiry))
            .with_sweep_interval(Duration::from_secs(sweep));
        config.validate()?;
        Ok(config)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_key_expiry: None,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

fn env_var(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::Config(format!("{name} must be a non-negative integer, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}

fn secs<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

fn opt_secs<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Duration>, D::Error> {
    let secs = Option::<u64>::deserialize(deserializer)?;
    Ok(secs.filter(|s| *s > 0).map(Duration::from_secs))
}
