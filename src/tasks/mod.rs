//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache instance.
//!
//! # Tasks
//! - Expiry sweep: removes expired entries at a fixed interval

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweep, SweeperHandle};
