use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::phonics::lesson::LessonFlow;
use crate::progression::reducer::ProgressEvent;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/transition", post(transition))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LessonAction {
    Advance,
    Back,
    Complete {
        score: u8,
        #[serde(default)]
        on: Option<NaiveDate>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransitionRequest {
    lesson_id: String,
    #[serde(default)]
    flow: Option<LessonFlow>,
    action: LessonAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionData {
    flow: LessonFlow,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<ProgressEvent>,
}

async fn transition(Json(body): Json<TransitionRequest>) -> Result<impl IntoResponse, AppError> {
    let mut flow = body.flow.unwrap_or_else(|| LessonFlow::new(body.lesson_id.clone()));
    if flow.lesson_id != body.lesson_id {
        return Err(AppError::bad_request("flow belongs to a different lesson"));
    }

    let event = match body.action {
        LessonAction::Advance => {
            flow.advance()?;
            None
        }
        LessonAction::Back => {
            flow.back()?;
            None
        }
        LessonAction::Complete { score, on } => {
            Some(flow.complete(score, on.unwrap_or_else(|| Utc::now().date_naive()))?)
        }
    };

    Ok(ok(TransitionData { flow, event }))
}
