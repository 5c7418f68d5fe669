mod health;
mod lessons;
mod phonemes;
mod progression;
mod pronunciation;
mod quests;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let healthcheck_endpoint = normalize_healthcheck_endpoint(
        std::env::var("HEALTHCHECK_ENDPOINT")
            .ok()
            .as_deref()
            .unwrap_or("/health"),
    );

    let mut app = Router::new()
        .nest("/api/pronunciation", pronunciation::router())
        .nest("/api/phonemes", phonemes::router())
        .nest("/api/progression", progression::router())
        .nest("/api/quests", quests::router())
        .nest("/api/lessons", lessons::router());

    let mut health_paths = vec!["/health".to_string()];
    if healthcheck_endpoint != "/" && !health_paths.contains(&healthcheck_endpoint) {
        health_paths.push(healthcheck_endpoint);
    }
    for path in &health_paths {
        app = app.nest(path.as_str(), health::router());
    }

    app.fallback(fallback_handler).with_state(state)
}

fn normalize_healthcheck_endpoint(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "/health".to_string();
    }

    let with_slash = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };

    if with_slash != "/" {
        with_slash.trim_end_matches('/').to_string()
    } else {
        "/".to_string()
    }
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}
