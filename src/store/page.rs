//! Page Module
//!
//! Defines the stored page record, the retention window, and the expiry
//! predicate shared by the read path and the sweeper.

use std::num::NonZeroU32;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::error::{AppError, Result};
use crate::store::ID_ENTROPY_BYTES;

// == Retention ==
/// How long a page stays reachable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// The page never expires
    Indefinite,
    /// The page expires this many days after creation
    Days(NonZeroU32),
}

impl Retention {
    /// Maps a raw day count to a retention window.
    ///
    /// Zero and negative counts mean "keep forever".
    pub fn from_days(days: i64) -> Self {
        u32::try_from(days)
            .ok()
            .and_then(NonZeroU32::new)
            .map_or(Retention::Indefinite, Retention::Days)
    }

    /// Computes the expiry instant for a page created at `created_at`.
    ///
    /// Fails with a validation error when the window runs past the last
    /// representable instant.
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
        match self {
            Retention::Indefinite => Ok(None),
            Retention::Days(days) => created_at
                .checked_add_signed(Duration::days(i64::from(days.get())))
                .map(Some)
                .ok_or_else(|| AppError::Validation("Invalid expiration option".to_string())),
        }
    }
}

// == Page ==
/// A single stored HTML submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Public link token and primary key
    pub id: String,
    /// Raw HTML, stored verbatim
    pub content: String,
    /// Byte length of `content` at creation
    pub content_size: u64,
    /// Creation instant (UTC, millisecond precision)
    pub created_at: DateTime<Utc>,
    /// Expiry instant, None = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl Page {
    // == Is Expired ==
    /// Checks whether the page has lapsed at `now`.
    ///
    /// A page is expired only when its expiry is strictly before `now`; the
    /// sweeper's `expires_at < now` query uses the same boundary.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.expires_at, now)
    }

    // == Time Remaining ==
    /// Human-readable time left before the page lapses.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> String {
        let Some(expires_at) = self.expires_at else {
            return "Never expires".to_string();
        };

        let delta = expires_at - now;
        if delta <= Duration::zero() {
            return "Expired".to_string();
        }

        let days = delta.num_days();
        let hours = (delta - Duration::days(days)).num_hours();
        if days > 0 {
            format!("{} day(s), {} hour(s)", days, hours)
        } else {
            format!("{} hour(s)", hours)
        }
    }
}

/// Expiry predicate on a raw expiry column value.
pub fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expires_at {
        Some(expires) => expires < now,
        None => false,
    }
}

// == Utility Functions ==
/// Generates a fresh URL-safe page id from the OS random source.
pub fn generate_id() -> String {
    let mut bytes = [0u8; ID_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Truncates an instant to the millisecond precision the store persists.
pub fn truncate_to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}
