//! API Handlers
//!
//! HTTP request handlers for each page server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::info;

use super::views;
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    HealthResponse, PageInfoResponse, UploadRequest, UploadResponse, ValidatedUpload,
};
use crate::store::{Page, PageStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Durable page store (cheap to clone, shares one pool)
    pub store: PageStore,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState with the given store and configuration.
    pub fn new(store: PageStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration, opening the configured database.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = PageStore::connect(&config.database_url).await?;
        Ok(Self::new(store, config.clone()))
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json") || accept.contains("text/plain"))
}

async fn store_upload(state: &AppState, upload: ValidatedUpload) -> Result<(Page, String)> {
    let page = state.store.create(upload.content, upload.retention).await?;
    let link = state.config.page_link(&page.id);
    info!(
        page_id = %page.id,
        size_bytes = page.content_size,
        expires_at = ?page.expires_at,
        "page uploaded"
    );
    Ok((page, link))
}

/// Handler for GET /
///
/// Renders the upload form.
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(views::index_page(&state.config))
}

/// Handler for POST /upload
///
/// Accepts pasted HTML or a file from the browser form. Answers with JSON
/// when the client asks for it, otherwise with the success page.
pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response> {
    let upload = UploadRequest::from_multipart(multipart)
        .await?
        .validate_form(&state.config)?;

    let (page, link) = store_upload(&state, upload).await?;

    if wants_json(&headers) {
        return Ok(Json(UploadResponse::new(&page, link)).into_response());
    }

    Ok(Html(views::success_page(&state.config, &page, &link, Utc::now())).into_response())
}

/// Handler for POST /api/upload
///
/// File upload for scripted clients, e.g.
/// `curl -F "html_file=@page.html" -F "expiration=7" {BASE_URL}/api/upload`.
pub async fn api_upload_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let upload = UploadRequest::from_multipart(multipart)
        .await?
        .validate_api(&state.config)?;

    let (page, link) = store_upload(&state, upload).await?;

    Ok(Json(UploadResponse::new(&page, link)))
}

/// Handler for GET /link/:id
///
/// Serves the stored HTML verbatim.
pub async fn view_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let page = state.store.fetch(&id).await?;
    Ok(Html(page.content))
}

/// Handler for GET /api/info/:id
///
/// Returns page metadata without the content.
pub async fn info_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PageInfoResponse>> {
    let now = Utc::now();
    let page = state.store.fetch_at(&id, now).await?;
    Ok(Json(PageInfoResponse::new(&page, now)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
