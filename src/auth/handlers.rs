use askama::Template;
use axum::extract::State;
use axum::response::{Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::{Flash, FlashLevel, SessionUser};
use crate::db::users;
use crate::error::AppResult;
use crate::extractors::{AdminContext, RequestContext};
use crate::routes::Html;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

// -- Templates --

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub flashes: Vec<Flash>,
    pub username: String,
    pub entered_username: String,
}

#[derive(Template)]
#[template(path = "admin/setup.html")]
pub struct SetupTemplate {
    pub flashes: Vec<Flash>,
    pub username: String,
    pub entered_username: String,
}

// -- Request types --

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct SetupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// Problem with a setup submission, if any.
pub fn setup_problem(form: &SetupForm) -> Option<&'static str> {
    if form.username.trim().is_empty() {
        Some("ユーザー名を入力してください。")
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        Some("パスワードは8文字以上にしてください。")
    } else if form.password != form.password_confirm {
        Some("パスワードが一致しません。")
    } else {
        None
    }
}

// -- Login handlers --

/// GET /admin/login — login form, or setup while no account exists
pub async fn login_page(
    State(state): State<AppState>,
    mut ctx: RequestContext,
) -> AppResult<Response> {
    if users::count_users(&state.db)? == 0 {
        return ctx.finish(Redirect::to("/admin/setup")).await;
    }

    let flashes = ctx.take_flashes();
    ctx.finish(Html(LoginTemplate {
        flashes,
        username: String::new(),
        entered_username: String::new(),
    }))
    .await
}

/// POST /admin/login — check credentials against the stored hash
pub async fn login_submit(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let username = form.username.trim();

    match users::verify_credentials(&state.db, username, &form.password)? {
        Some(user) => {
            tracing::info!("Admin '{}' logged in", user.username);
            ctx.login(SessionUser {
                id: user.id,
                username: user.username,
            });
            ctx.flash(FlashLevel::Success, "ログインしました。");
            ctx.finish(Redirect::to("/admin")).await
        }
        None => {
            tracing::warn!("Failed login attempt for '{}'", username);
            ctx.flash(FlashLevel::Danger, "ログインに失敗しました。");
            let flashes = ctx.take_flashes();
            let entered_username = username.to_string();
            ctx.finish(Html(LoginTemplate {
                flashes,
                username: String::new(),
                entered_username,
            }))
            .await
        }
    }
}

/// GET /admin/logout — clear the session and go back to the login form
pub async fn logout(mut admin: AdminContext) -> AppResult<Response> {
    tracing::info!("Admin '{}' logged out", admin.user.username);
    admin.ctx.logout();
    admin.ctx.flash(FlashLevel::Info, "ログアウトしました。");
    admin.ctx.finish(Redirect::to("/admin/login")).await
}

// -- First-run setup handlers --

/// GET /admin/setup — only reachable until the first account exists
pub async fn setup_page(
    State(state): State<AppState>,
    mut ctx: RequestContext,
) -> AppResult<Response> {
    if users::count_users(&state.db)? > 0 {
        return ctx.finish(Redirect::to("/admin/login")).await;
    }

    let flashes = ctx.take_flashes();
    ctx.finish(Html(SetupTemplate {
        flashes,
        username: String::new(),
        entered_username: String::new(),
    }))
    .await
}

/// POST /admin/setup — create the first admin and sign them in
pub async fn setup_submit(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<SetupForm>,
) -> AppResult<Response> {
    if users::count_users(&state.db)? > 0 {
        ctx.flash(FlashLevel::Warning, "管理者アカウントは既に作成されています。");
        return ctx.finish(Redirect::to("/admin/login")).await;
    }

    if let Some(problem) = setup_problem(&form) {
        ctx.flash(FlashLevel::Danger, problem);
        let flashes = ctx.take_flashes();
        let entered_username = form.username.trim().to_string();
        return ctx
            .finish(Html(SetupTemplate {
                flashes,
                username: String::new(),
                entered_username,
            }))
            .await;
    }

    let username = form.username.trim().to_string();
    let hash = bcrypt::hash(&form.password, state.config.auth.password_cost)?;
    let Some(id) = users::create_first_user(&state.db, &username, &hash)? else {
        ctx.flash(FlashLevel::Warning, "管理者アカウントは既に作成されています。");
        return ctx.finish(Redirect::to("/admin/login")).await;
    };
    tracing::info!("Created admin account '{}' via setup", username);

    ctx.login(SessionUser { id, username });
    ctx.flash(FlashLevel::Success, "管理者アカウントを作成しました。");
    ctx.finish(Redirect::to("/admin")).await
}
