use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementCategory {
    Streak,
    Experience,
    Lessons,
    Pronunciation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AchievementCondition {
    Streak(u32),
    TotalXp(u64),
    LevelReached(u32),
    LessonsCompleted(u32),
    WordsPracticed(u32),
    PerfectPronunciations(u32),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub tier: u8,
    pub condition: AchievementCondition,
}

/// Counters an unlock rule can look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AchievementStats {
    pub streak_days: u32,
    pub total_xp: u64,
    pub level: u32,
    pub lessons_completed: u32,
    pub words_practiced: u32,
    pub perfect_pronunciations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    pub achievement_id: &'static str,
    pub current_value: u64,
    pub target_value: u64,
    pub percentage: u8,
    pub unlocked: bool,
}

const CATALOG: &[Achievement] = &[
    Achievement {
        id: "first-steps",
        name: "First Steps",
        description: "Finish your very first lesson",
        category: AchievementCategory::Lessons,
        tier: 1,
        condition: AchievementCondition::LessonsCompleted(1),
    },
    Achievement {
        id: "lesson-lover",
        name: "Lesson Lover",
        description: "Finish 10 lessons",
        category: AchievementCategory::Lessons,
        tier: 2,
        condition: AchievementCondition::LessonsCompleted(10),
    },
    Achievement {
        id: "on-a-roll",
        name: "On a Roll",
        description: "Practice 3 days in a row",
        category: AchievementCategory::Streak,
        tier: 1,
        condition: AchievementCondition::Streak(3),
    },
    Achievement {
        id: "week-warrior",
        name: "Week Warrior",
        description: "Practice 7 days in a row",
        category: AchievementCategory::Streak,
        tier: 2,
        condition: AchievementCondition::Streak(7),
    },
    Achievement {
        id: "xp-collector",
        name: "XP Collector",
        description: "Earn 500 XP",
        category: AchievementCategory::Experience,
        tier: 1,
        condition: AchievementCondition::TotalXp(500),
    },
    Achievement {
        id: "rising-star",
        name: "Rising Star",
        description: "Reach level 5",
        category: AchievementCategory::Experience,
        tier: 2,
        condition: AchievementCondition::LevelReached(5),
    },
    Achievement {
        id: "word-explorer",
        name: "Word Explorer",
        description: "Practice 50 words",
        category: AchievementCategory::Pronunciation,
        tier: 1,
        condition: AchievementCondition::WordsPracticed(50),
    },
    Achievement {
        id: "perfect-ten",
        name: "Perfect Ten",
        description: "Say 10 words perfectly",
        category: AchievementCategory::Pronunciation,
        tier: 2,
        condition: AchievementCondition::PerfectPronunciations(10),
    },
];

pub fn catalog() -> &'static [Achievement] {
    CATALOG
}

pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

impl AchievementCondition {
    fn current_and_target(&self, stats: &AchievementStats) -> (u64, u64) {
        match *self {
            AchievementCondition::Streak(n) => (stats.streak_days.into(), n.into()),
            AchievementCondition::TotalXp(n) => (stats.total_xp, n),
            AchievementCondition::LevelReached(n) => (stats.level.into(), n.into()),
            AchievementCondition::LessonsCompleted(n) => (stats.lessons_completed.into(), n.into()),
            AchievementCondition::WordsPracticed(n) => (stats.words_practiced.into(), n.into()),
            AchievementCondition::PerfectPronunciations(n) => {
                (stats.perfect_pronunciations.into(), n.into())
            }
        }
    }

    pub fn is_met(&self, stats: &AchievementStats) -> bool {
        let (current, target) = self.current_and_target(stats);
        current >= target
    }
}

/// Achievements whose condition now holds and that are not in `unlocked` yet.
pub fn newly_unlocked(
    stats: &AchievementStats,
    unlocked: &BTreeSet<String>,
) -> Vec<&'static Achievement> {
    CATALOG
        .iter()
        .filter(|a| !unlocked.contains(a.id))
        .filter(|a| a.condition.is_met(stats))
        .collect()
}

pub fn progress(stats: &AchievementStats, unlocked: &BTreeSet<String>) -> Vec<AchievementProgress> {
    CATALOG
        .iter()
        .map(|a| {
            let (current, target) = a.condition.current_and_target(stats);
            let is_unlocked = unlocked.contains(a.id);
            let percentage = if is_unlocked {
                100
            } else if target > 0 {
                ((current as f64 / target as f64) * 100.0).round().clamp(0.0, 100.0) as u8
            } else {
                0
            };
            AchievementProgress {
                achievement_id: a.id,
                current_value: current,
                target_value: target,
                percentage,
                unlocked: is_unlocked,
            }
        })
        .collect()
}
