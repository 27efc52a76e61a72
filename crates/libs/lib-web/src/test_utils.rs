//! Shared helpers for handler and service tests.

use crate::server::{build_router, AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use lib_core::{create_memory_pool, Config, DbPool};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "Secret123";

const BOUNDARY: &str = "stufffindr-test-boundary";

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-key-must-be-at-least-32-characters-long!".to_string(),
        jwt_expiration_hours: 24,
        upload_dir: upload_dir.to_path_buf(),
    }
}

/// Full router over an in-memory database and a temporary upload directory.
pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    pub config: Config,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = create_memory_pool().await.expect("Failed to create test database");
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let config = test_config(upload_dir.path());

        let router = build_router(AppState::new(pool.clone(), config.clone()), &[]);

        Self {
            router,
            pool,
            config,
            upload_dir,
        }
    }

    /// Send a request and decode the JSON body (`Value::Null` for non-JSON bodies).
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    /// Sign up `username` and return `(user id, token)`.
    pub async fn signup(&self, username: &str) -> (i64, String) {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/api/v1/users/signup",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": TEST_PASSWORD,
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");

        let id = body["user"]["userId"].as_i64().unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        (id, token)
    }

    /// Create an item as the holder of `token` and return its id.
    pub async fn create_item(&self, token: &str, title: &str) -> i64 {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/api/v1/items",
                Some(token),
                json!({
                    "title": title,
                    "description": "black leather",
                    "location": "Park Ave",
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create item failed: {body}");

        body["item"]["itemId"].as_i64().unwrap()
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// One part of a multipart body.
pub struct Part {
    name: String,
    file: Option<(String, String)>,
    data: Vec<u8>,
}

impl Part {
    pub fn file(name: &str, file_name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            file: Some((file_name.to_string(), content_type.to_string())),
            data,
        }
    }

    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match &part.file {
            Some((file_name, content_type)) => {
                let header = format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: {}\r\n\r\n",
                    part.name, file_name, content_type
                );
                body.extend_from_slice(header.as_bytes());
            }
            None => {
                let header =
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name);
                body.extend_from_slice(header.as_bytes());
            }
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn with_bearer(mut req: Request<Body>, token: &str) -> Request<Body> {
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    req
}
