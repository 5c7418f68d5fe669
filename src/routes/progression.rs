use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progression::achievements;
use crate::progression::level::LevelInfo;
use crate::progression::quests::QuestBoard;
use crate::progression::reducer::{ProgressEvent, ProgressState};
use crate::response::{ok, AppError};
use crate::services::progress::apply_event;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/levels/:xp", get(level_for_xp))
        .route("/events", post(apply))
        .route("/normalize", post(normalize))
        .route("/achievements", post(achievement_progress))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRequest {
    #[serde(default)]
    state: ProgressState,
    #[serde(default)]
    board: Option<QuestBoard>,
    event: ProgressEvent,
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct AchievementsRequest {
    #[serde(default)]
    state: ProgressState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AchievementsData {
    unlocked_count: usize,
    achievements: Vec<achievements::AchievementProgress>,
}

async fn level_for_xp(Path(xp): Path<String>) -> Result<impl IntoResponse, AppError> {
    let xp: u64 = xp
        .trim()
        .parse()
        .map_err(|_| AppError::validation("xp must be a non-negative integer"))?;
    Ok(ok(LevelInfo::from_xp(xp)))
}

async fn apply(Json(body): Json<EventRequest>) -> impl IntoResponse {
    let now = body.now.unwrap_or_else(Utc::now);
    ok(apply_event(body.state, body.board, &body.event, now))
}

async fn normalize(Json(snapshot): Json<ProgressState>) -> impl IntoResponse {
    ok(ProgressState::from_snapshot(snapshot))
}

async fn achievement_progress(Json(body): Json<AchievementsRequest>) -> impl IntoResponse {
    let state = ProgressState::from_snapshot(body.state);
    let report = achievements::progress(&state.achievement_stats(), &state.achievements);
    ok(AchievementsData {
        unlocked_count: report.iter().filter(|p| p.unlocked).count(),
        achievements: report,
    })
}
