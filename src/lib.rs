pub mod config;
pub mod logging;
pub mod phonics;
pub mod progression;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::state::AppState;

pub fn create_app() -> axum::Router {
    let config = Config::from_env();
    create_app_with_state(AppState::from_config(&config))
}

pub fn create_app_with_state(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
