//! Cancellation Context
//!
//! Carries caller cancellation and deadlines into `get_or_set_with_lock`
//! and on into the caller-supplied getter.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::CacheError;

// == Context ==
/// A cancellation token paired with an optional deadline.
///
/// Cloning a context shares its token: cancelling any clone cancels all of
/// them. Use [`Context::child`] for a context that can be cancelled on its
/// own while still following its parent.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A child context that expires after `timeout`. A timeout too large to
    /// be represented as an instant adds no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.child(),
        }
    }

    /// A child context that expires at `deadline`, or at the parent's
    /// deadline if that comes first.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// A child context cancelled with its parent, or on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the context error if the context is already done.
    pub fn err(&self) -> Option<CacheError> {
        if self.token.is_cancelled() {
            Some(CacheError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(CacheError::DeadlineExceeded)
        } else {
            None
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Completes once the context is cancelled or its deadline passes,
    /// yielding the matching error.
    pub async fn done(&self) -> CacheError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => CacheError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => CacheError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                CacheError::Cancelled
            }
        }
    }
}
