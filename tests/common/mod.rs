//! Shared helpers for driving the router against in-memory stores.

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::{Body, Bytes},
    extract::DefaultBodyLimit,
    http::{HeaderMap, Request, StatusCode, header},
};
use catalog_back::{
    AppState,
    config::MediaConfig,
    repositories::{MemoryProductRepository, MemorySessionStore, MemoryUserStore, UserStore},
    routes,
};
use tower::ServiceExt;

pub const STAFF_USER: &str = "admin";
pub const STAFF_PASSWORD: &str = "s3cret-pass";
pub const REGULAR_USER: &str = "shopper";
pub const REGULAR_PASSWORD: &str = "shopper-pass";

pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub media_root: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Same as [`TestApp::new`], with request bodies capped at `limit` bytes.
    pub async fn with_body_limit(limit: usize) -> Self {
        Self::build(Some(limit)).await
    }

    async fn build(body_limit: Option<usize>) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        users
            .create(STAFF_USER, &bcrypt::hash(STAFF_PASSWORD, 4).unwrap(), true)
            .await
            .unwrap();
        users
            .create(REGULAR_USER, &bcrypt::hash(REGULAR_PASSWORD, 4).unwrap(), false)
            .await
            .unwrap();

        let sessions = Arc::new(MemorySessionStore::new());
        let media_root =
            std::env::temp_dir().join(format!("catalog-test-media-{}", uuid::Uuid::new_v4()));

        let state = AppState {
            products: Arc::new(MemoryProductRepository::new()),
            users: users.clone(),
            sessions: sessions.clone(),
            media: MediaConfig::new(&media_root, "/media/"),
        };

        let mut router = routes::create_router();
        if let Some(limit) = body_limit {
            router = router.layer(DefaultBodyLimit::max(limit));
        }

        Self {
            router: router.with_state(state),
            users,
            sessions,
            media_root,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: serde_json::Value) -> TestResponse {
        self.send(json_request(method, uri, &body.to_string())).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Creates a product and returns its id.
    pub async fn create_product(&self, body: serde_json::Value) -> i64 {
        let response = self.send_json("POST", "/products/enter/", body).await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["id"].as_i64().unwrap()
    }

    pub async fn cleanup(self) {
        let _ = tokio::fs::remove_dir_all(&self.media_root).await;
    }
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let boundary = "catalog-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}
