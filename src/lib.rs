//! HTML Drop - A small HTML hosting service
//!
//! Stores submitted HTML behind unguessable links, with optional expiry
//! enforced on read and by a periodic sweep.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_sweeper, SweeperHandle};
