//! Response DTOs for the page server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::store::Page;

fn to_rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Response body for a successful upload (POST /upload, POST /api/upload)
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Public link to the page
    pub link: String,
    pub id: String,
    /// RFC 3339 expiry, null when the page never expires
    pub expires_at: Option<String>,
    pub size_bytes: u64,
}

impl UploadResponse {
    /// Creates a new UploadResponse for a stored page
    pub fn new(page: &Page, link: impl Into<String>) -> Self {
        Self {
            success: true,
            link: link.into(),
            id: page.id.clone(),
            expires_at: page.expires_at.map(to_rfc3339),
            size_bytes: page.content_size,
        }
    }
}

/// Response body for page metadata (GET /api/info/:id)
#[derive(Debug, Clone, Serialize)]
pub struct PageInfoResponse {
    pub id: String,
    pub created_at: String,
    pub expires_at: Option<String>,
    /// e.g. "6 day(s), 23 hour(s)" or "Never expires"
    pub time_remaining: String,
    pub size_bytes: u64,
}

impl PageInfoResponse {
    /// Creates a new PageInfoResponse as seen at `now`
    pub fn new(page: &Page, now: DateTime<Utc>) -> Self {
        Self {
            id: page.id.clone(),
            created_at: to_rfc3339(page.created_at),
            expires_at: page.expires_at.map(to_rfc3339),
            time_remaining: page.time_remaining(now),
            size_bytes: page.content_size,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
