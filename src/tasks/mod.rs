//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiration Sweeper: Purges expired pages at the configured interval

mod sweeper;

pub use sweeper::{spawn_sweeper, SweeperHandle};
