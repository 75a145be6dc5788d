//! RC-044: HTTP handlers — HTML pages, JSON API, chart download.

use super::clean::clean_text;
use super::pages;
use super::AppState;
use crate::chart::hasher;
use crate::chart::render::ChartFormat;
use crate::core::types::{submission_from_value, Recipe};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Route key of the cached recipe list page.
pub const RECIPES_PAGE: &str = "/recipes";

fn html_status(status: StatusCode, body: String) -> Response {
    (status, Html(body)).into_response()
}

fn not_found_page() -> Response {
    html_status(StatusCode::NOT_FOUND, pages::not_found())
}

fn server_error_page() -> Response {
    html_status(StatusCode::INTERNAL_SERVER_ERROR, pages::server_error())
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"status": "error", "message": message})),
    )
        .into_response()
}

/// GET / — featured recipe, all recipes, count.
pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    let store = state.catalog.store();
    let recipes = store.get_all();
    Html(pages::home(recipes.first(), &recipes))
}

/// GET /recipes — served through the page cache.
pub async fn recipes(State(state): State<Arc<AppState>>) -> Html<String> {
    let store = state.catalog.store();
    Html(
        state
            .pages
            .get_or_insert_with(RECIPES_PAGE, || pages::recipe_list(&store.get_all())),
    )
}

/// GET /recipe/:name
pub async fn recipe_detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let name = clean_text(&name);
    match state.catalog.store().get_by_name(&name) {
        Some(recipe) => Html(pages::recipe_detail(&recipe)).into_response(),
        None => not_found_page(),
    }
}

/// GET /about
pub async fn about() -> Html<String> {
    Html(pages::about(&pages::FACTS))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /search — no `q` lists everything; a present `q`, even empty, is a search.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let store = state.catalog.store();
    match params.q {
        None => Html(pages::search(None, &store.get_all())),
        Some(raw) => {
            let query = clean_text(&raw);
            let results = store.search(&query);
            Html(pages::search(Some(&query), &results))
        }
    }
}

/// GET /api/recipes
pub async fn api_list(State(state): State<Arc<AppState>>) -> Json<Vec<Recipe>> {
    Json(state.catalog.store().get_all())
}

/// POST /api/recipes
pub async fn api_add(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let value = match body {
        Ok(Json(v)) => v,
        Err(rejection) => {
            warn!(error = %rejection, "rejected recipe body");
            return error_json(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };
    let submission = match submission_from_value(value) {
        Ok(s) => s,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, &format!("Failed to add recipe: {e}")),
    };

    let catalog = Arc::clone(&state.catalog);
    match tokio::task::spawn_blocking(move || catalog.add(&submission)).await {
        Ok(Ok(outcome)) => {
            state.pages.clear();
            info!(name = %outcome.added.recipe.name, "recipe added via API");
            (
                StatusCode::CREATED,
                Json(json!({"status": "success", "message": "Recipe added"})),
            )
                .into_response()
        }
        Ok(Err(e)) => error_json(StatusCode::BAD_REQUEST, &format!("Failed to add recipe: {e}")),
        Err(e) => {
            error!(error = %e, "add task failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to add recipe")
        }
    }
}

/// GET /api/recipes/:name
pub async fn api_detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    let name = clean_text(&name);
    match state.catalog.store().get_by_name(&name) {
        Some(recipe) => Json(recipe).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Recipe not found"})),
        )
            .into_response(),
    }
}

/// GET /chart — refresh lazily, then serve the current artifact.
pub async fn chart(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let catalog = Arc::clone(&state.catalog);
    let path = match tokio::task::spawn_blocking(move || catalog.charts().ensure_current(false)).await
    {
        Ok(Ok(refresh)) => Some(refresh.path().to_path_buf()),
        Ok(Err(_)) => state.catalog.charts().current_artifact(),
        Err(e) => {
            error!(error = %e, "chart task failed");
            return server_error_page();
        }
    };
    let Some(path) = path else {
        return not_found_page();
    };

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "chart vanished before it was served");
            return not_found_page();
        }
    };

    let etag = hasher::etag(&bytes);
    let content_type = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ChartFormat::from_extension)
        .map_or("application/octet-stream", ChartFormat::content_type);

    let matches = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag);
    if matches {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        bytes,
    )
        .into_response()
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// Any unknown route.
pub async fn fallback() -> Response {
    not_found_page()
}
