pub mod admin;
pub mod api;
pub mod assets;
pub mod auth;
pub mod frontend;

use askama::Template;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

/// Assemble the full application router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.storage.max_body_bytes;

    Router::new()
        .merge(auth::router())
        .merge(admin::router())
        .merge(api::router())
        .route("/static/{*path}", get(assets::serve_static))
        .route("/frontend/{*path}", get(frontend::asset))
        .fallback(frontend::spa_fallback)
        // Multipart reads honour DefaultBodyLimit; the tower layer turns away
        // oversized bodies before any handler runs.
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
