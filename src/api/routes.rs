//! API Routes
//!
//! Configures the Axum router with all page server endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    api_upload_handler, health_handler, index_handler, info_handler, upload_handler,
    view_handler, AppState,
};

/// Room for multipart boundaries, field headers and the small form fields
/// on top of the content itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Upload form
/// - `POST /upload` - Browser upload (pasted HTML or file)
/// - `POST /api/upload` - Scripted file upload, JSON response
/// - `GET /link/:id` - Serve a stored page
/// - `GET /api/info/:id` - Page metadata
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Body limit: configured maximum content size plus multipart overhead
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_size
        .saturating_add(MULTIPART_OVERHEAD);

    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/", get(index_handler))
        .route("/upload", post(upload_handler))
        .route("/api/upload", post(api_upload_handler))
        .route("/link/:id", get(view_handler))
        .route("/api/info/:id", get(info_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::PageStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    async fn create_test_app() -> Router {
        let store = PageStore::in_memory().await.unwrap();
        let state = AppState::new(store, Config::default());
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_endpoint() {
        let app = create_test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_link_not_found() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/link/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_info_not_found() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/info/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
