#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ats_backend::{
    middleware::auth::Claims,
    routes::{self, RouteLimits},
    services::{memory_store::MemoryCandidateStore, workflow_notifier::N8nNotifier},
    AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test_secret_key";
pub const WEBHOOK_SECRET: &str = "whsec_test";

/// Router backed by the in-memory store. `n8n_url` is the automation
/// webhook; `None` leaves the integration disabled.
pub fn app(n8n_url: Option<String>) -> Router {
    let store = Arc::new(MemoryCandidateStore::new());
    let notifier = N8nNotifier::new(
        n8n_url,
        Some(WEBHOOK_SECRET.to_string()),
        Duration::from_secs(2),
    )
    .expect("notifier");
    let state = AppState::new(store, Arc::new(notifier), JWT_SECRET, Some(WEBHOOK_SECRET));
    routes::router(
        state,
        RouteLimits {
            public_rps: 1000,
            integration_rps: 1000,
        },
    )
}

pub fn staff_token(role: &str) -> String {
    let claims = Claims {
        sub: "8c5b1e52-4a0e-4c0b-9a55-6f0f3f1f2a10".into(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        role: Some(role.into()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode jwt")
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

/// Invites one candidate through the staff API and returns its record.
pub async fn invite(app: &Router, name: &str, email: &str) -> JsonValue {
    let token = staff_token("hr");
    let (status, body) = send(
        app,
        Method::POST,
        "/api/candidates",
        Some(&token),
        Some(serde_json::json!({ "name": name, "email": email, "position": "Backend Engineer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "invite failed: {}", body);
    body["data"].clone()
}
