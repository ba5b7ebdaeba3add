#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use kissa::config::Config;
use kissa::db::{self, SeedAdmin};
use kissa::routes::build_router;
use kissa::state::{AppState, DbPool};

pub const ADMIN_USER: &str = "owner";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub router: Router,
    pub db: DbPool,
    pub config: Config,
    // Dropping the directory removes the database and uploads.
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.database.path = Some(dir.path().join("kissa.db"));
    config.storage.uploads = Some(dir.path().join("uploads"));
    config.storage.frontend = dir.path().join("dist");
    config.auth.password_cost = 4;
    config
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(|_| {})
}

pub fn spawn_app_with(adjust: impl FnOnce(&mut Config)) -> TestApp {
    let dir = TempDir::new().expect("failed to create temp dir");
    let mut config = test_config(&dir);
    adjust(&mut config);
    std::fs::create_dir_all(config.uploads_path()).expect("failed to create uploads dir");

    let pool = db::create_pool(&config.db_path()).expect("failed to create test database");
    let admin = SeedAdmin::new(ADMIN_USER, ADMIN_PASSWORD, 4).expect("failed to hash password");
    db::bootstrap(&pool, Some(&admin)).expect("failed to bootstrap database");

    let state = AppState::new(pool.clone(), config.clone()).expect("failed to build state");
    TestApp {
        router: build_router(state),
        db: pool,
        config,
        dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("failed to build request"))
            .await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(
            builder
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
        )
        .await
    }

    /// Log in as the seeded admin and return the `Cookie` header value.
    pub async fn login(&self) -> String {
        let body = format!("username={}&password=correct+horse+battery", ADMIN_USER);
        let resp = self.post_form("/admin/login", &body, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/admin");
        session_cookie(&resp).expect("login did not set a session cookie")
    }
}

/// `name=value` of the session cookie set by a response, if any.
pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with("kissa_session="))
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.len() > "kissa_session=".len())
        .map(str::to_string)
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not json")
}

pub const BOUNDARY: &str = "kissa-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, body: Vec<u8>, cookie: Option<&str>) -> Request<Body> {
    let length = body.len();
    let mut request = streamed_multipart_request(uri, body, cookie);
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, length.into());
    request
}

/// Multipart POST without a `Content-Length`, as a chunked upload arrives.
pub fn streamed_multipart_request(uri: &str, body: Vec<u8>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).expect("failed to build request")
}
