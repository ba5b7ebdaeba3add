use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

use crate::auth::session::{generate_token, ANONYMOUS_TTL_MINUTES};
use crate::auth::{Flash, FlashLevel, Session, SessionStore, SessionUser};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Per-request view of the visitor's session.
///
/// Handlers mutate the session through this context and hand their response
/// to [`RequestContext::finish`], which persists the session and attaches
/// the signed cookie.
pub struct RequestContext {
    session: Session,
    jar: SignedCookieJar,
    store: Arc<dyn SessionStore>,
    cookie_name: String,
    session_hours: u64,
    /// The session came from the store under its current id.
    persisted: bool,
    /// Id abandoned by a login or logout, destroyed on finish.
    stale_id: Option<String>,
}

impl RequestContext {
    pub fn user(&self) -> Option<&SessionUser> {
        self.session.user.as_ref()
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.session.flashes.push(Flash {
            level,
            message: message.into(),
        });
    }

    /// Drain pending flash messages for display.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.session.flashes)
    }

    /// Authenticate under a fresh session id.
    pub fn login(&mut self, user: SessionUser) {
        self.rotate();
        self.session.user = Some(user);
    }

    /// Drop everything held in the session, including pending messages.
    pub fn logout(&mut self) {
        self.rotate();
        self.session.user = None;
        self.session.flashes.clear();
    }

    fn rotate(&mut self) {
        if self.persisted {
            self.stale_id = Some(self.session.id.clone());
        }
        self.session.id = generate_token();
        self.persisted = false;
    }

    pub async fn finish(self, response: impl IntoResponse) -> AppResult<Response> {
        if let Some(stale) = &self.stale_id {
            self.store.destroy(stale).await?;
        }

        let mut jar = self.jar;
        if !self.session.is_empty() {
            self.store.save(&self.session).await?;
            let max_age = match self.session.user {
                Some(_) => time::Duration::hours(self.session_hours as i64),
                None => time::Duration::minutes(ANONYMOUS_TTL_MINUTES),
            };
            jar = jar.add(session_cookie(&self.cookie_name, &self.session.id, max_age));
        } else {
            // Flashes delivered and nobody signed in: nothing left to keep
            if self.persisted {
                self.store.destroy(&self.session.id).await?;
            }
            if jar.get(&self.cookie_name).is_some() {
                jar = jar.remove(removal_cookie(&self.cookie_name));
            }
        }

        Ok((jar, response).into_response())
    }
}

fn session_cookie(name: &str, id: &str, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(max_age)
        .build()
}

fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        let cookie_name = state.config.auth.cookie_name.clone();

        // A cookie with a bad signature never reaches the store
        let loaded = match jar.get(&cookie_name) {
            Some(cookie) => state.sessions.load(cookie.value()).await?,
            None => None,
        };
        let persisted = loaded.is_some();
        let session = loaded.unwrap_or_default();

        Ok(RequestContext {
            session,
            jar,
            store: state.sessions.clone(),
            cookie_name,
            session_hours: state.config.auth.session_hours,
            persisted,
            stale_id: None,
        })
    }
}

/// Extractor for admin-only views. Visitors without an authenticated
/// session are redirected to the login page with a warning.
pub struct AdminContext {
    pub user: SessionUser,
    pub ctx: RequestContext,
}

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let mut ctx = RequestContext::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match ctx.user().cloned() {
            Some(user) => Ok(AdminContext { user, ctx }),
            None => {
                ctx.flash(FlashLevel::Warning, "ログインが必要です。");
                Err(ctx
                    .finish(Redirect::to("/admin/login"))
                    .await
                    .into_response())
            }
        }
    }
}
