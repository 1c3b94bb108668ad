//! Helpers for driving the router against an in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use base64ct::{Base64, Encoding};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::password::hash_password,
    state::AppState,
    store::{CatalogStore, MemoryStore},
    users::repo_types::{NewUser, User},
};

pub fn basic_auth(name: &str, pass: &str) -> String {
    format!("Basic {}", Base64::encode_string(format!("{name}:{pass}").as_bytes()))
}

pub async fn seed_user(store: &dyn CatalogStore, email: &str, password: &str) -> User {
    store
        .create_user(NewUser {
            first_name: "Test".into(),
            last_name: "User".into(),
            email_address: email.into(),
            password_hash: hash_password(password).expect("hash"),
        })
        .await
        .expect("seed user")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when empty.
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: &Router, req: Request<Body>) -> TestResponse {
    let res = router.clone().oneshot(req).await.expect("infallible");
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = build_app(AppState::from_store(store.clone()));
        Self { router, store }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        auth: Option<String>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        send(&self.router, req).await
    }
}
