use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::progression::quests::{QuestBoard, QuestCompletion};
use crate::progression::reducer::{reduce, ProgressEvent, ProgressState, Transition};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(flatten)]
    pub transition: Transition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<QuestBoard>,
    pub quest_completions: Vec<QuestCompletion>,
}

/// Reduces one learner event, advances the quest board with it and folds any
/// quest rewards back into the progress state.
pub fn apply_event(
    state: ProgressState,
    board: Option<QuestBoard>,
    event: &ProgressEvent,
    now: DateTime<Utc>,
) -> ProgressUpdate {
    let mut transition = reduce(state, event);

    let Some(mut board) = board else {
        return ProgressUpdate {
            transition,
            board: None,
            quest_completions: Vec::new(),
        };
    };

    let completions = board.track(event, &transition, now);
    for completion in &completions {
        info!(quest = %completion.title, xp = completion.xp_reward, "daily quest completed");
        let reward = reduce(transition.state, &completion.to_event());
        transition.notices.extend(reward.notices);
        transition.state = reward.state;
    }

    ProgressUpdate {
        transition,
        board: Some(board),
        quest_completions: completions,
    }
}
