pub mod achievements;
pub mod level;
pub mod quests;
pub mod reducer;

pub use level::{
    level_from_xp, level_progress_percent, xp_for_next_level, xp_progress_in_level,
    xp_threshold_for_level, LevelInfo, XpProgress,
};
pub use reducer::{reduce, ProgressEvent, ProgressNotice, ProgressState, Transition};
