use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::achievements::{self, AchievementStats};
use super::level::{self, LevelInfo};

const LESSON_XP: u32 = 50;
const LESSON_MASTERY_BONUS_XP: u32 = 25;
const LESSON_MASTERY_SCORE: u8 = 90;
const PRACTICE_XP: u32 = 5;
const PERFECT_PRACTICE_XP: u32 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_on: Option<NaiveDate>,
}

impl Streak {
    /// Counts activity on `on`. Returns true when the current streak changed.
    fn touch(&mut self, on: NaiveDate) -> bool {
        let before = self.current;
        match self.last_active_on {
            None => self.current = 1,
            Some(last) if on <= last => return false,
            Some(last) if last.succ_opt() == Some(on) => self.current = self.current.saturating_add(1),
            Some(_) => self.current = 1,
        }
        self.last_active_on = Some(on);
        self.longest = self.longest.max(self.current);
        self.current != before
    }

    /// Breaks the streak if a whole calendar day passed without activity.
    fn check_gap(&mut self, today: NaiveDate) -> bool {
        let Some(last) = self.last_active_on else {
            return false;
        };
        if self.current > 0 && (today - last).num_days() > 1 {
            self.current = 0;
            return true;
        }
        false
    }
}

/// A learner's progression. Only `xp` and the counters are authoritative;
/// the level fields are recomputed from `xp` on every load and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressState {
    pub xp: u64,
    pub level: u32,
    pub level_title: String,
    pub level_progress: u8,
    pub xp_for_next_level: u64,
    pub streak: Streak,
    pub lessons_completed: u32,
    pub words_practiced: u32,
    pub perfect_pronunciations: u32,
    pub achievements: BTreeSet<String>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::with_xp(0)
    }
}

impl ProgressState {
    pub fn with_xp(xp: u64) -> Self {
        let mut state = Self {
            xp,
            level: 1,
            level_title: String::new(),
            level_progress: 0,
            xp_for_next_level: 0,
            streak: Streak::default(),
            lessons_completed: 0,
            words_practiced: 0,
            perfect_pronunciations: 0,
            achievements: BTreeSet::new(),
        };
        state.recompute_level();
        state
    }

    /// Rebuilds derived fields of a persisted snapshot, ignoring whatever
    /// level it claims.
    pub fn from_snapshot(mut snapshot: ProgressState) -> Self {
        snapshot.recompute_level();
        snapshot
    }

    pub fn level_info(&self) -> LevelInfo {
        LevelInfo::from_xp(self.xp)
    }

    pub fn achievement_stats(&self) -> AchievementStats {
        AchievementStats {
            streak_days: self.streak.current,
            total_xp: self.xp,
            level: self.level,
            lessons_completed: self.lessons_completed,
            words_practiced: self.words_practiced,
            perfect_pronunciations: self.perfect_pronunciations,
        }
    }

    fn recompute_level(&mut self) {
        let info = LevelInfo::from_xp(self.xp);
        self.level = info.level;
        self.level_title = info.level_title;
        self.level_progress = info.level_progress;
        self.xp_for_next_level = info.xp_for_next_level;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ProgressEvent {
    XpAwarded {
        amount: u32,
        reason: String,
    },
    LessonCompleted {
        lesson_id: String,
        assessment_score: u8,
        on: NaiveDate,
    },
    PronunciationScored {
        overall: u8,
        on: NaiveDate,
    },
    DayStarted {
        on: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ProgressNotice {
    XpGained { amount: u32, reason: String },
    LevelUp { from: u32, to: u32, title: String },
    StreakUpdated { current: u32, longest: u32 },
    StreakBroken,
    AchievementUnlocked { id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub state: ProgressState,
    pub notices: Vec<ProgressNotice>,
}

impl Transition {
    pub fn xp_gained(&self) -> u32 {
        self.notices
            .iter()
            .map(|n| match n {
                ProgressNotice::XpGained { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }
}

pub fn lesson_xp(assessment_score: u8) -> u32 {
    if assessment_score >= LESSON_MASTERY_SCORE {
        LESSON_XP + LESSON_MASTERY_BONUS_XP
    } else {
        LESSON_XP
    }
}

pub fn practice_xp(overall: u8) -> u32 {
    if overall == 100 {
        PERFECT_PRACTICE_XP
    } else {
        PRACTICE_XP
    }
}

pub fn reduce(state: ProgressState, event: &ProgressEvent) -> Transition {
    let mut state = ProgressState::from_snapshot(state);
    let mut notices = Vec::new();
    let level_before = state.level;

    match event {
        ProgressEvent::XpAwarded { amount, reason } => {
            gain(&mut state, &mut notices, *amount, reason.clone());
        }
        ProgressEvent::LessonCompleted {
            lesson_id,
            assessment_score,
            on,
        } => {
            touch_streak(&mut state, &mut notices, *on);
            state.lessons_completed = state.lessons_completed.saturating_add(1);
            gain(
                &mut state,
                &mut notices,
                lesson_xp(*assessment_score),
                format!("lesson:{lesson_id}"),
            );
        }
        ProgressEvent::PronunciationScored { overall, on } => {
            touch_streak(&mut state, &mut notices, *on);
            state.words_practiced = state.words_practiced.saturating_add(1);
            if *overall == 100 {
                state.perfect_pronunciations = state.perfect_pronunciations.saturating_add(1);
            }
            gain(&mut state, &mut notices, practice_xp(*overall), "practice".to_string());
        }
        ProgressEvent::DayStarted { on } => {
            if state.streak.check_gap(*on) {
                notices.push(ProgressNotice::StreakBroken);
            }
        }
    }

    state.recompute_level();
    if state.level > level_before {
        notices.push(ProgressNotice::LevelUp {
            from: level_before,
            to: state.level,
            title: state.level_title.clone(),
        });
    }

    for achievement in achievements::newly_unlocked(&state.achievement_stats(), &state.achievements) {
        state.achievements.insert(achievement.id.to_string());
        notices.push(ProgressNotice::AchievementUnlocked {
            id: achievement.id.to_string(),
            name: achievement.name.to_string(),
        });
    }

    Transition { state, notices }
}

fn gain(state: &mut ProgressState, notices: &mut Vec<ProgressNotice>, amount: u32, reason: String) {
    if amount == 0 {
        return;
    }
    state.xp = state.xp.saturating_add(u64::from(amount));
    notices.push(ProgressNotice::XpGained { amount, reason });
}

fn touch_streak(state: &mut ProgressState, notices: &mut Vec<ProgressNotice>, on: NaiveDate) {
    if state.streak.touch(on) {
        notices.push(ProgressNotice::StreakUpdated {
            current: state.streak.current,
            longest: state.streak.longest,
        });
    }
}
