use serde::{Deserialize, Serialize};

use super::similarity::similarity;
use super::types::PronunciationScore;

const DEFAULT_MATCH_THRESHOLD: f64 = 0.8;
const DEFAULT_SIMILARITY_WEIGHT: f64 = 0.4;
const DEFAULT_COMPLETENESS_WEIGHT: f64 = 0.35;
const DEFAULT_ACCURACY_WEIGHT: f64 = 0.25;

/// Tunables for [`score_with`]. The defaults are fixed product constants, not
/// fitted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// A word counts as matched when its similarity is strictly above this.
    pub match_threshold: f64,
    pub similarity_weight: f64,
    pub completeness_weight: f64,
    pub accuracy_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            similarity_weight: DEFAULT_SIMILARITY_WEIGHT,
            completeness_weight: DEFAULT_COMPLETENESS_WEIGHT,
            accuracy_weight: DEFAULT_ACCURACY_WEIGHT,
        }
    }
}

impl ScoringConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            match_threshold: env_unit_f64("PRONUNCIATION_MATCH_THRESHOLD")
                .unwrap_or(defaults.match_threshold),
            similarity_weight: env_unit_f64("PRONUNCIATION_SIMILARITY_WEIGHT")
                .unwrap_or(defaults.similarity_weight),
            completeness_weight: env_unit_f64("PRONUNCIATION_COMPLETENESS_WEIGHT")
                .unwrap_or(defaults.completeness_weight),
            accuracy_weight: env_unit_f64("PRONUNCIATION_ACCURACY_WEIGHT")
                .unwrap_or(defaults.accuracy_weight),
        }
    }
}

/// Scores `actual` against `expected` with the default weights.
pub fn score(expected: &str, actual: &str) -> PronunciationScore {
    score_with(expected, actual, &ScoringConfig::default())
}

pub fn score_with(expected: &str, actual: &str, config: &ScoringConfig) -> PronunciationScore {
    let expected = expected.trim().to_lowercase();
    let actual = actual.trim().to_lowercase();

    if expected == actual {
        return PronunciationScore::PERFECT;
    }

    let sim = similarity(&expected, &actual);

    let expected_words: Vec<&str> = expected.split_whitespace().collect();
    let actual_words: Vec<&str> = actual.split_whitespace().collect();

    let matched = expected_words
        .iter()
        .filter(|word| {
            actual_words
                .iter()
                .any(|heard| similarity(word, heard) > config.match_threshold)
        })
        .count() as f64;

    let completeness = if expected_words.is_empty() {
        0.0
    } else {
        (matched / expected_words.len() as f64 * 100.0).min(100.0)
    };

    let accuracy = if actual_words.is_empty() {
        0.0
    } else {
        (matched / actual_words.len() as f64 * 100.0).min(100.0)
    };

    let similarity_pct = sim * 100.0;
    let overall = similarity_pct * config.similarity_weight
        + completeness * config.completeness_weight
        + accuracy * config.accuracy_weight;

    PronunciationScore {
        overall: to_percent(overall),
        accuracy: to_percent(accuracy),
        completeness: to_percent(completeness),
        similarity: to_percent(similarity_pct),
    }
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn env_unit_f64(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
}
