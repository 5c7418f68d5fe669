use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reducer::{ProgressEvent, Transition};

pub const QUEST_REASON_PREFIX: &str = "quest:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    CompleteLessons,
    PracticeWords,
    PerfectPronunciations,
    EarnXp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuest {
    pub id: Uuid,
    pub kind: QuestKind,
    pub title: String,
    pub description: String,
    pub target_value: u32,
    pub current_value: u32,
    pub completed: bool,
    pub xp_reward: u32,
    pub expires_at: DateTime<Utc>,
}

impl DailyQuest {
    fn new(kind: QuestKind, title: &str, description: &str, target: u32, reward: u32, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            description: description.to_string(),
            target_value: target,
            current_value: 0,
            completed: false,
            xp_reward: reward,
            expires_at,
        }
    }

    pub fn progress_percent(&self) -> u8 {
        if self.target_value == 0 {
            return 100;
        }
        ((self.current_value as f64 / self.target_value as f64) * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestCompletion {
    pub quest_id: Uuid,
    pub title: String,
    pub xp_reward: u32,
}

impl QuestCompletion {
    pub fn to_event(&self) -> ProgressEvent {
        ProgressEvent::XpAwarded {
            amount: self.xp_reward,
            reason: format!("{QUEST_REASON_PREFIX}{}", self.title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestBoard {
    pub day: NaiveDate,
    pub expires_at: DateTime<Utc>,
    pub quests: Vec<DailyQuest>,
}

/// Start of the next UTC day after `now`.
pub fn next_daily_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX);
    tomorrow.and_time(NaiveTime::default()).and_utc()
}

impl QuestBoard {
    pub fn daily(now: DateTime<Utc>) -> Self {
        let expires_at = next_daily_boundary(now);
        Self {
            day: now.date_naive(),
            expires_at,
            quests: vec![
                DailyQuest::new(QuestKind::CompleteLessons, "Lesson Time", "Finish 2 lessons", 2, 30, expires_at),
                DailyQuest::new(QuestKind::PracticeWords, "Word Warm-up", "Practice 10 words", 10, 20, expires_at),
                DailyQuest::new(
                    QuestKind::PerfectPronunciations,
                    "Sharp Sounds",
                    "Say 3 words perfectly",
                    3,
                    25,
                    expires_at,
                ),
                DailyQuest::new(QuestKind::EarnXp, "XP Hunter", "Earn 100 XP", 100, 20, expires_at),
            ],
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Clears all counters for the day containing `now`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        let expires_at = next_daily_boundary(now);
        self.day = now.date_naive();
        self.expires_at = expires_at;
        for quest in &mut self.quests {
            quest.current_value = 0;
            quest.completed = false;
            quest.expires_at = expires_at;
        }
    }

    /// Resets the board if its day is over. Returns whether it did.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_expired(now) {
            self.reset(now);
            return true;
        }
        false
    }

    pub fn record(&mut self, kind: QuestKind, amount: u32, now: DateTime<Utc>) -> Vec<QuestCompletion> {
        self.refresh(now);
        if amount == 0 {
            return Vec::new();
        }

        let mut completions = Vec::new();
        for quest in self.quests.iter_mut().filter(|q| q.kind == kind && !q.completed) {
            quest.current_value = quest.current_value.saturating_add(amount).min(quest.target_value);
            if quest.current_value >= quest.target_value {
                quest.completed = true;
                completions.push(QuestCompletion {
                    quest_id: quest.id,
                    title: quest.title.clone(),
                    xp_reward: quest.xp_reward,
                });
            }
        }
        completions
    }

    /// Feeds a reduced progress event into the matching quests. XP that came
    /// from quest rewards does not count toward XP quests.
    pub fn track(&mut self, event: &ProgressEvent, transition: &Transition, now: DateTime<Utc>) -> Vec<QuestCompletion> {
        let mut completions = Vec::new();
        match event {
            ProgressEvent::LessonCompleted { .. } => {
                completions.extend(self.record(QuestKind::CompleteLessons, 1, now));
            }
            ProgressEvent::PronunciationScored { overall, .. } => {
                completions.extend(self.record(QuestKind::PracticeWords, 1, now));
                if *overall == 100 {
                    completions.extend(self.record(QuestKind::PerfectPronunciations, 1, now));
                }
            }
            ProgressEvent::XpAwarded { reason, .. } if reason.starts_with(QUEST_REASON_PREFIX) => {
                return completions;
            }
            ProgressEvent::XpAwarded { .. } | ProgressEvent::DayStarted { .. } => {}
        }
        completions.extend(self.record(QuestKind::EarnXp, transition.xp_gained(), now));
        completions
    }

    pub fn all_completed(&self) -> bool {
        self.quests.iter().all(|q| q.completed)
    }
}
