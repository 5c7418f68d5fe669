use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::phonics::scoring::score_with;
use crate::response::{ok, AppError};
use crate::services::pronunciation::{evaluate_attempt, AttemptRequest};
use crate::state::AppState;

const MAX_PHRASE_CHARS: usize = 200;
const MAX_PREVIOUS_ATTEMPTS: usize = 10;
const MAX_PHONEME_LIST: usize = 10;
const SETTINGS_TOKEN_HEADER: &str = "x-settings-token";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/score", post(score))
        .route("/feedback", post(feedback))
        .route("/settings", get(settings).put(update_settings))
}

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    expected: String,
    #[serde(default)]
    actual: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackSettings {
    llm_enabled: bool,
    remote_available: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSettingsRequest {
    llm_enabled: bool,
}

async fn score(
    State(state): State<AppState>,
    Json(body): Json<ScoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_phrase("expected", &body.expected)?;
    validate_phrase("actual", &body.actual)?;
    Ok(ok(score_with(&body.expected, &body.actual, state.scoring())))
}

async fn feedback(
    State(state): State<AppState>,
    Json(body): Json<AttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_attempt(&body)?;

    let use_remote = state.runtime().is_llm_enabled();
    debug!(target_word = %body.target_word, attempt = body.attempt_number, use_remote, "evaluating attempt");
    let evaluation = evaluate_attempt(state.classifier(), state.scoring(), body, use_remote).await;
    Ok(ok(evaluation))
}

async fn settings(State(state): State<AppState>) -> impl IntoResponse {
    ok(FeedbackSettings {
        llm_enabled: state.runtime().is_llm_enabled(),
        remote_available: state.classifier().remote_available(),
    })
}

/// Operator endpoint: the toggle applies to every client of this process.
async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let presented = headers.get(SETTINGS_TOKEN_HEADER).and_then(|v| v.to_str().ok());
    if !state.runtime().may_change_settings(presented) {
        tracing::warn!("rejected feedback settings change without a valid token");
        return Err(AppError::unauthorized("settings token required"));
    }

    state.runtime().set_llm_enabled(body.llm_enabled);
    tracing::info!(llm_enabled = body.llm_enabled, "feedback settings updated");
    Ok(ok(FeedbackSettings {
        llm_enabled: state.runtime().is_llm_enabled(),
        remote_available: state.classifier().remote_available(),
    }))
}

/// Everything here ends up in the remote prompt, so each text and list is
/// bounded.
fn validate_attempt(body: &AttemptRequest) -> Result<(), AppError> {
    validate_phrase("targetWord", &body.target_word)?;
    validate_phrase("recognizedWord", &body.recognized_word)?;
    if body.target_word.trim().is_empty() {
        return Err(AppError::validation("targetWord must not be empty"));
    }

    validate_list("previousAttempts", &body.previous_attempts, MAX_PREVIOUS_ATTEMPTS)?;
    if let Some(symbol) = &body.phoneme_symbol {
        validate_phrase("phonemeSymbol", symbol)?;
    }
    if let Some(phoneme) = &body.phoneme {
        validate_phrase("phoneme.symbol", &phoneme.symbol)?;
        validate_phrase("phoneme.ipa", &phoneme.ipa)?;
        validate_phrase("phoneme.category", &phoneme.category)?;
        validate_phrase("phoneme.description", &phoneme.description)?;
        validate_list("phoneme.tips", &phoneme.tips, MAX_PHONEME_LIST)?;
        validate_list("phoneme.exampleWords", &phoneme.example_words, MAX_PHONEME_LIST)?;
    }
    Ok(())
}

fn validate_list(field: &str, values: &[String], max_len: usize) -> Result<(), AppError> {
    if values.len() > max_len {
        return Err(AppError::validation(format!("{field} must have at most {max_len} entries")));
    }
    values.iter().try_for_each(|value| validate_phrase(field, value))
}

fn validate_phrase(field: &str, value: &str) -> Result<(), AppError> {
    if value.chars().count() > MAX_PHRASE_CHARS {
        return Err(AppError::validation(format!(
            "{field} must be at most {MAX_PHRASE_CHARS} characters"
        )));
    }
    Ok(())
}
