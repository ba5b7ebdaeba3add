use axum::routing::get;
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/login",
            get(handlers::login_page).post(handlers::login_submit),
        )
        .route("/admin/logout", get(handlers::logout))
        .route(
            "/admin/setup",
            get(handlers::setup_page).post(handlers::setup_submit),
        )
}
