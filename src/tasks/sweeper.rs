//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries, bounding
//! the memory held by entries that expire without ever being read again.
//! Lookups still hide expired entries on their own; the sweep only reclaims.

use std::sync::Weak;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Something the sweeper can purge of expired entries.
#[async_trait]
pub trait Sweep: Send + Sync + 'static {
    /// Removes every expired entry, returning how many were removed.
    async fn sweep_expired(&self) -> usize;
}

// == Sweeper Handle ==
/// Owns the sweeper task. Dropping the handle stops the task.
#[derive(Debug)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task to stop. It exits at its next wake-up at the latest.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawns a task that sweeps `target` every `interval`.
///
/// The task holds only a weak reference, so it never keeps a cache alive; it
/// exits when stopped or when the target has been dropped.
///
/// Must be called from within a tokio runtime.
pub fn spawn_sweeper<T: Sweep>(target: Weak<T>, interval: Duration) -> SweeperHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let handle = tokio::spawn(async move {
        debug!(interval_ms = interval.as_millis() as u64, "Expiry sweeper started");

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let Some(target) = target.upgrade() else {
                break;
            };
            let removed = target.sweep_expired().await;

            if removed > 0 {
                info!(removed, "Expiry sweep removed expired entries");
            } else {
                debug!("Expiry sweep found no expired entries");
            }
        }

        debug!("Expiry sweeper stopped");
    });

    SweeperHandle { cancel, handle }
}
