//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Errors are `Clone` so a single getter outcome can be handed to every
/// caller waiting on the same key.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Invalid construction parameters
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Construction attempted outside a tokio runtime
    #[error("No tokio runtime available to run the expiry sweeper")]
    NoRuntime,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller's context was cancelled
    #[error("Context cancelled")]
    Cancelled,

    /// The caller's context deadline passed
    #[error("Context deadline exceeded")]
    DeadlineExceeded,

    /// The value producer of a get-or-set call failed
    #[error("Getter failed: {0}")]
    Getter(Arc<anyhow::Error>),

    /// The in-flight computation ended without publishing a result
    #[error("In-flight computation aborted for key: {0}")]
    Aborted(String),
}

impl CacheError {
    /// Returns true for errors originating from the caller's own context.
    pub fn is_context_error(&self) -> bool {
        matches!(self, CacheError::Cancelled | CacheError::DeadlineExceeded)
    }
}

impl From<anyhow::Error> for CacheError {
    fn from(err: anyhow::Error) -> Self {
        CacheError::Getter(Arc::new(err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
