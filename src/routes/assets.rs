use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Embed)]
#[folder = "static/"]
struct StaticAssets;

const LONG_CACHE: &str = "public, max-age=86400";
const NO_CACHE: &str = "no-cache";

/// `/static/uploads/*` comes from the upload directory, everything else
/// under `/static/` is compiled into the binary.
pub async fn serve_static(
    State(state): State<AppState>,
    axum::extract::Path(path): axum::extract::Path<String>,
) -> AppResult<Response> {
    if let Some(rel) = path.strip_prefix("uploads/") {
        return serve_from_dir(&state.config.uploads_path(), rel, NO_CACHE).await;
    }

    match StaticAssets::get(&path) {
        Some(file) => Ok(file_response(&path, file.data.to_vec(), LONG_CACHE)),
        None => Err(AppError::NotFound),
    }
}

/// Join `rel` onto `root`, refusing anything that could step outside it.
pub fn resolve_within(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => path.push(part),
            _ => return None,
        }
    }
    Some(path)
}

/// Contents of a regular file, or `None` if it is missing or not a file.
pub async fn read_file(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => tokio::fs::read(path).await.ok(),
        _ => None,
    }
}

pub async fn serve_from_dir(root: &Path, rel: &str, cache: &str) -> AppResult<Response> {
    let path = resolve_within(root, rel).ok_or(AppError::NotFound)?;
    let data = read_file(&path).await.ok_or(AppError::NotFound)?;
    Ok(file_response(rel, data, cache))
}

pub fn file_response(name: &str, data: Vec<u8>, cache: &str) -> Response {
    let mime = mime_guess::from_path(name).first_or_octet_stream();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, cache.to_string()),
        ],
        data,
    )
        .into_response()
}
