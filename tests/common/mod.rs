// Shared helpers for the integration tests. Each test binary uses a subset.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use journal_api::auth::TokenCodec;
use journal_api::routes;
use journal_api::services::media::{FixedMediaHost, MediaHost};
use journal_api::state::AppState;
use journal_api::store::memory::MemoryStore;
use journal_api::store::models::{Identity, ROLE_ADMIN, ROLE_USER};
use journal_api::store::IdentityStore;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const MEDIA_BASE: &str = "https://media.test";

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

pub struct TestApp {
    pub router: axum::Router,
    pub state: AppState,
}

/// Build the full application against the in-memory store and a fixed-URL
/// media host. No network, no database.
pub fn test_app() -> TestApp {
    test_app_with_media(Arc::new(FixedMediaHost::new(MEDIA_BASE)))
}

pub fn test_app_with_media(media: Arc<dyn MediaHost>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        codec: Arc::new(TokenCodec::from_secret(TEST_SECRET, 24).expect("test codec")),
        identities: store.clone(),
        journals: store,
        media,
    };

    TestApp {
        router: routes::app(state.clone()),
        state,
    }
}

/// Drive one request through the router and decode the JSON body (Null for
/// empty bodies).
pub async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };

    (status, body)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Hand-rolled multipart form matching what the journal handlers read.
pub fn multipart_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((name, filename, data)) = file {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn signup(app: &TestApp, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        &app.router,
        json_request(
            "POST",
            "/api/v1/signup",
            None,
            json!({ "username": username, "password": password }),
        ),
    )
    .await
}

/// Sign up (if needed) and log in, returning a bearer token.
pub async fn login_token(app: &TestApp, username: &str, password: &str) -> String {
    signup(app, username, password).await;

    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/api/v1/login",
            None,
            json!({ "username": username, "password": password }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["data"]["token"].as_str().expect("token in login response").to_string()
}

/// Insert an admin identity directly through the store collaborator, the way
/// an operator would provision one out of band.
pub async fn seed_admin(app: &TestApp, username: &str, password: &str) {
    let hash = bcrypt::hash(password, 4).expect("test hash");
    let identity = Identity::new(
        username.to_string(),
        hash,
        vec![ROLE_USER.to_string(), ROLE_ADMIN.to_string()],
    );
    app.state.identities.save(&identity).await.expect("seed admin");
}

/// Create a journal entry for the given token and return its id.
pub async fn create_entry(app: &TestApp, token: &str, title: &str, content: &str) -> String {
    let (status, body) = send(
        &app.router,
        multipart_request(
            "POST",
            "/api/v1/journal",
            Some(token),
            &[("title", title), ("content", content)],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["data"]["id"].as_str().expect("journal id").to_string()
}
