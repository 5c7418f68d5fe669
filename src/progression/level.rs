use serde::{Deserialize, Serialize};

const BASE_THRESHOLD: f64 = 100.0;
const GROWTH_FACTOR: f64 = 1.5;

const LEVEL_TITLES: &[(u32, &str)] = &[
    (1, "Sound Seedling"),
    (3, "Letter Explorer"),
    (5, "Sound Detective"),
    (8, "Blend Builder"),
    (12, "Word Wizard"),
    (16, "Reading Ranger"),
    (20, "Phonics Champion"),
    (25, "Phonics Legend"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpProgress {
    pub current: u64,
    pub required: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub xp: u64,
    pub level: u32,
    pub level_title: String,
    pub level_progress: u8,
    pub xp_in_level: u64,
    pub xp_for_next_level: u64,
}

impl LevelInfo {
    pub fn from_xp(xp: u64) -> Self {
        let (level, progress) = accumulate(xp);
        Self {
            xp,
            level,
            level_title: level_title(level).to_string(),
            level_progress: percent(progress),
            xp_in_level: progress.current,
            xp_for_next_level: progress.required - progress.current,
        }
    }
}

/// XP needed to clear `level`: `floor(100 * 1.5^(level - 1))`. Levels below
/// 1 are treated as level 1.
pub fn xp_threshold_for_level(level: u32) -> u64 {
    let exponent = level.max(1) - 1;
    let raw = BASE_THRESHOLD * GROWTH_FACTOR.powi(exponent.min(i32::MAX as u32) as i32);
    // float-to-int casts saturate, so runaway levels stay finite
    raw.floor() as u64
}

pub fn level_from_xp(total_xp: u64) -> u32 {
    accumulate(total_xp).0
}

pub fn xp_progress_in_level(total_xp: u64) -> XpProgress {
    accumulate(total_xp).1
}

pub fn level_progress_percent(total_xp: u64) -> u8 {
    percent(xp_progress_in_level(total_xp))
}

pub fn xp_for_next_level(total_xp: u64) -> u64 {
    let progress = xp_progress_in_level(total_xp);
    progress.required - progress.current
}

pub fn level_title(level: u32) -> &'static str {
    LEVEL_TITLES
        .iter()
        .rev()
        .find(|(min_level, _)| level >= *min_level)
        .map(|(_, title)| *title)
        .unwrap_or(LEVEL_TITLES[0].1)
}

// Shared by level and progress lookups so the two can never disagree.
fn accumulate(total_xp: u64) -> (u32, XpProgress) {
    let mut level = 1u32;
    let mut remaining = total_xp;
    loop {
        let required = xp_threshold_for_level(level);
        if remaining < required {
            return (
                level,
                XpProgress {
                    current: remaining,
                    required,
                },
            );
        }
        remaining -= required;
        level += 1;
    }
}

fn percent(progress: XpProgress) -> u8 {
    (progress.current as f64 / progress.required as f64 * 100.0).round() as u8
}
