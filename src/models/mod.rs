//! Request and Response models for the page server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! reading upload requests and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{UploadRequest, ValidatedUpload};
pub use responses::{HealthResponse, PageInfoResponse, UploadResponse};
