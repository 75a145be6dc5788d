//! Web layer — axum router over the catalog, with a TTL page cache.

pub mod cache;
pub mod clean;
pub mod handlers;
pub mod pages;

use crate::catalog::Catalog;
use axum::{routing::get, Router};
use cache::PageCache;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared state handed to every handler.
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub pages: PageCache,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, page_ttl: Duration) -> Self {
        Self {
            catalog,
            pages: PageCache::new(page_ttl),
        }
    }
}

/// Build the router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/recipes", get(handlers::recipes))
        .route("/recipe/:name", get(handlers::recipe_detail))
        .route("/about", get(handlers::about))
        .route("/search", get(handlers::search))
        .route(
            "/api/recipes",
            get(handlers::api_list).post(handlers::api_add),
        )
        .route("/api/recipes/:name", get(handlers::api_detail))
        .route("/chart", get(handlers::chart))
        .route("/health", get(handlers::health))
        .fallback(handlers::fallback)
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: Arc<AppState>, bind: &str) -> Result<(), String> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| format!("cannot bind {}: {}", bind, e))?;
    info!(%bind, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("server error: {}", e))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
