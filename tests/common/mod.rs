use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use danci_phonics::phonics::feedback::FeedbackClassifier;
use danci_phonics::phonics::scoring::ScoringConfig;
use danci_phonics::state::{AppState, RuntimeConfig};

pub fn create_test_app() -> Router {
    create_test_app_with_runtime(RuntimeConfig::default())
}

#[allow(dead_code)]
pub fn create_test_app_with_runtime(runtime: RuntimeConfig) -> Router {
    let state = AppState::new(FeedbackClassifier::deterministic_only(), ScoringConfig::default(), runtime);
    danci_phonics::create_app_with_state(state)
}

#[allow(dead_code)]
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

#[allow(dead_code)]
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request_json(app, "POST", uri, body).await
}

#[allow(dead_code)]
pub async fn request_json(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    request_json_with_headers(app, method, uri, &[], body).await
}

#[allow(dead_code)]
pub async fn request_json_with_headers(
    app: Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
