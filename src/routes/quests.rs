use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progression::quests::{QuestBoard, QuestCompletion, QuestKind};
use crate::response::ok;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/daily", get(daily))
        .route("/progress", post(progress))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRequest {
    board: QuestBoard,
    kind: QuestKind,
    #[serde(default = "one")]
    amount: u32,
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressData {
    board: QuestBoard,
    completions: Vec<QuestCompletion>,
    xp_awarded: u32,
    all_completed: bool,
}

async fn daily() -> impl IntoResponse {
    ok(QuestBoard::daily(Utc::now()))
}

async fn progress(Json(body): Json<ProgressRequest>) -> impl IntoResponse {
    let mut board = body.board;
    let completions = board.record(body.kind, body.amount, body.now.unwrap_or_else(Utc::now));
    let xp_awarded = completions.iter().map(|c| c.xp_reward).sum();
    ok(ProgressData {
        all_completed: board.all_completed(),
        board,
        completions,
        xp_awarded,
    })
}
