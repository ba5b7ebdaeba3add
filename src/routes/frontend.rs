use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;

use crate::error::{AppError, AppResult};
use crate::routes::assets::{file_response, read_file, resolve_within, serve_from_dir};
use crate::state::AppState;

/// Path prefixes the single-page fallback never answers for.
const RESERVED_PREFIXES: &[&str] = &["api", "admin", "static"];

/// `path` is the request path without its leading slash.
pub fn is_reserved(path: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// `GET /frontend/{path}`: bundle files only, no index fallback.
pub async fn asset(State(state): State<AppState>, Path(path): Path<String>) -> AppResult<Response> {
    serve_from_dir(&state.config.storage.frontend, &path, "public, max-age=3600").await
}

/// Serve a bundle file when one matches, otherwise the bundle's `index.html`
/// so client-side routing can take over.
pub async fn spa_fallback(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> AppResult<Response> {
    if method != Method::GET && method != Method::HEAD {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    // Match bundle files by their decoded name, as `/frontend/{path}` does
    let decoded = percent_decode_str(uri.path())
        .decode_utf8()
        .map_err(|_| AppError::NotFound)?;
    let path = decoded.trim_start_matches('/');
    if is_reserved(path) {
        return Err(AppError::NotFound);
    }

    let root = &state.config.storage.frontend;
    if !path.is_empty() {
        if let Some(file) = resolve_within(root, path) {
            if let Some(data) = read_file(&file).await {
                return Ok(file_response(path, data, "public, max-age=3600"));
            }
        }
    }

    match read_file(&root.join("index.html")).await {
        Some(data) => Ok(file_response("index.html", data, "no-cache")),
        None => {
            tracing::warn!("Front-end bundle has no index.html in {}", root.display());
            Err(AppError::NotFound)
        }
    }
}
