//! Authentication and app helpers
//!
//! Builds an in-memory app, registers users in its directory and issues
//! tokens for them, then drives the router with `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use tripcollab::backend::auth::sessions::create_token;
use tripcollab::backend::plan::MemoryStore;
use tripcollab::backend::routes::create_router;
use tripcollab::backend::server::{AppState, ServerConfig};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

/// A registered user and a valid bearer token for them
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Router over in-memory storage plus its store for seeding
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

pub fn test_config() -> ServerConfig {
    ServerConfig::builder()
        .jwt_secret(TEST_SECRET)
        .build()
        .expect("test config is valid")
}

impl TestApp {
    pub fn new() -> Self {
        let (state, store) = AppState::in_memory(test_config());
        Self {
            router: create_router(state),
            store,
        }
    }

    /// Register a user and issue a token for them
    pub async fn user(&self, name: &str) -> TestUser {
        let email = format!("{}@example.com", name);
        let user = self.store.register_user(name, &email).await;
        let token = create_token(user.id, &email, TEST_SECRET).expect("token");
        TestUser {
            id: user.id,
            email,
            token,
        }
    }

    /// Send a request and decode the JSON response body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", user.token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }
}
