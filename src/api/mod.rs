//! API Module
//!
//! HTTP handlers and routing for the page server.
//!
//! # Endpoints
//! - `GET /` - Upload form
//! - `POST /upload` - Browser upload
//! - `POST /api/upload` - Scripted upload
//! - `GET /link/:id` - Serve a stored page
//! - `GET /api/info/:id` - Page metadata
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
mod views;

pub use handlers::*;
pub use routes::create_router;
