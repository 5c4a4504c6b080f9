//! Single-Flight Module
//!
//! Deduplicates concurrent loads of the same missing key. The first caller
//! to miss becomes the owner of an in-flight request; later callers for that
//! key subscribe to the owner's result instead of running their own getter.
//!
//! The table lives behind the same lock as the entry store, so a key is
//! either cached, loading, or absent, and never two of those at once.

use std::collections::HashMap;

use tokio::sync::watch;

use crate::context::Context;
use crate::error::{CacheError, Result};

type Slot<V> = Option<Result<V>>;

// == In-Flight Request ==
/// Publishing half of an outstanding load, held by whoever runs the getter.
#[derive(Debug)]
pub struct InFlightRequest<V> {
    tx: watch::Sender<Slot<V>>,
}

/// Subscription to an outstanding load.
#[derive(Debug, Clone)]
pub struct Waiter<V> {
    key: String,
    rx: watch::Receiver<Slot<V>>,
}

/// Result of joining the in-flight table for a key.
#[derive(Debug)]
pub enum Flight<V> {
    /// No load was running; the caller must run the getter and publish.
    Owner(InFlightRequest<V>, Waiter<V>),
    /// A load is already running; wait for its result.
    Follower(Waiter<V>),
}

// == In-Flight Table ==
/// At most one outstanding load per key.
#[derive(Debug)]
pub struct InFlightTable<V> {
    pending: HashMap<String, watch::Receiver<Slot<V>>>,
}

impl<V> Default for InFlightTable<V> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<V: Clone> InFlightTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Join ==
    /// Subscribes to the load for `key`, starting one if none is running.
    ///
    /// A pending entry whose publisher is gone is replaced: its owner died
    /// without resolving and its followers have already been released.
    pub fn join(&mut self, key: &str) -> Flight<V> {
        if let Some(rx) = self.pending.get(key) {
            if rx.has_changed().is_ok() {
                return Flight::Follower(Waiter {
                    key: key.to_string(),
                    rx: rx.clone(),
                });
            }
        }

        let (tx, rx) = watch::channel(None);
        self.pending.insert(key.to_string(), rx.clone());
        Flight::Owner(
            InFlightRequest { tx },
            Waiter {
                key: key.to_string(),
                rx,
            },
        )
    }

    // == Finish ==
    /// Publishes the outcome to every waiter and retires the request.
    pub fn finish(&mut self, key: &str, request: InFlightRequest<V>, outcome: Result<V>) {
        // Waiters may all have given up already; that is not an error.
        let _ = request.tx.send(Some(outcome));
        self.pending.remove(key);
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<V: Clone> Waiter<V> {
    // == Wait ==
    /// Waits for the published outcome, or for `ctx` to finish first.
    ///
    /// Giving up on a cancelled context only affects this caller; the load
    /// keeps running for everyone else.
    pub async fn wait(mut self, ctx: &Context) -> Result<V> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let published = tokio::select! {
            slot = self.rx.wait_for(Option::is_some) => {
                slot.ok().and_then(|slot| slot.clone())
            }
            err = ctx.done() => return Err(err),
        };

        published.unwrap_or_else(|| Err(CacheError::Aborted(self.key.clone())))
    }
}
