use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::accounts::account_router;
use super::catalog::catalog_router;
use super::media::download;
use crate::config::ServerConfig;
use crate::media::MediaStorage;
use crate::store::Store;

/// Shared by every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: MediaStorage,
    pub config: ServerConfig,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Self {
        Self {
            store,
            media: MediaStorage::new(&config.data_dir),
            config,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    response
}

/// Builds the full HTTP surface: health, public media downloads, and the
/// authenticated API under `/api`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/media/{kind}/{file}", get(download))
        .nest("/api", account_router().merge(catalog_router()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
