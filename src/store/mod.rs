//! Store Module
//!
//! Durable page storage with lazy expiry on read and bulk expiry on sweep.

mod page;
mod page_store;


// Re-export public types
pub use page::{generate_id, is_expired, Page, Retention};
pub use page_store::PageStore;

// == Public Constants ==
/// Random bytes behind each page id (encodes to 16 URL-safe characters)
pub const ID_ENTROPY_BYTES: usize = 12;

/// Insert attempts before giving up on finding an unused id
pub const MAX_ID_ATTEMPTS: u32 = 3;
