use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::phonics::phoneme;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/:symbol", get(detail))
}

async fn list() -> impl IntoResponse {
    ok(phoneme::catalog())
}

async fn detail(Path(symbol): Path<String>) -> Result<impl IntoResponse, AppError> {
    phoneme::find(&symbol)
        .map(ok)
        .ok_or_else(|| AppError::not_found(format!("unknown phoneme: {symbol}")))
}
