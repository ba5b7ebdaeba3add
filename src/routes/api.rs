//! Read-only JSON API consumed by the public front-end.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::db::models::{Announcement, Feature, GalleryImage};
use crate::db::{announcements, content, features, gallery};
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GalleryQuery {
    pub limit: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/content/{section}", get(content_section))
        .route("/api/features", get(list_features))
        .route("/api/gallery", get(list_gallery))
        .route("/api/announcements", get(list_announcements))
        .route("/api/navigation", get(navigation))
}

/// Only a plain positive integer counts as a limit.
pub fn parse_limit(raw: Option<&str>) -> Option<u32> {
    raw.filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
}

async fn content_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
) -> AppResult<Response> {
    match content::get_content_section(&state.db, &section)? {
        Some(section) => Ok(Json(section).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()),
    }
}

async fn list_features(State(state): State<AppState>) -> AppResult<Json<Vec<Feature>>> {
    Ok(Json(features::list_features(&state.db)?))
}

async fn list_gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> AppResult<Json<Vec<GalleryImage>>> {
    let limit = parse_limit(query.limit.as_deref());
    Ok(Json(gallery::list_gallery_images(&state.db, limit)?))
}

async fn list_announcements(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Announcement>>> {
    Ok(Json(announcements::list_announcements(&state.db)?))
}

async fn navigation(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "links": state.config.site.navigation }))
}
