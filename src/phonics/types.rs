use serde::{Deserialize, Serialize};

use super::phoneme::Phoneme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PronunciationScore {
    pub overall: u8,
    pub accuracy: u8,
    pub completeness: u8,
    pub similarity: u8,
}

impl PronunciationScore {
    pub const PERFECT: Self = Self {
        overall: 100,
        accuracy: 100,
        completeness: 100,
        similarity: 100,
    };

    pub fn is_perfect(&self) -> bool {
        self.overall == 100
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Excellent,
    Good,
    NeedsPractice,
    KeepTrying,
}

impl ConfidenceLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::Excellent => "excellent",
            ConfidenceLevel::Good => "good",
            ConfidenceLevel::NeedsPractice => "needs_practice",
            ConfidenceLevel::KeepTrying => "keep_trying",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "needs_practice" => Some(Self::NeedsPractice),
            "keep_trying" => Some(Self::KeepTrying),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIFeedback {
    pub overall_feedback: String,
    pub encouragement: String,
    pub specific_tips: Vec<String>,
    pub practice_recommendation: String,
    pub confidence_level: ConfidenceLevel,
}

/// Everything the feedback classifier knows about one spoken attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PronunciationContext {
    pub target_word: String,
    pub recognized_word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phoneme: Option<Phoneme>,
    pub score: PronunciationScore,
    pub attempt_number: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_attempts: Vec<String>,
}

impl PronunciationContext {
    pub fn new(
        target_word: impl Into<String>,
        recognized_word: impl Into<String>,
        score: PronunciationScore,
        attempt_number: u32,
    ) -> Self {
        Self {
            target_word: target_word.into(),
            recognized_word: recognized_word.into(),
            phoneme: None,
            score,
            attempt_number: attempt_number.max(1),
            previous_attempts: Vec::new(),
        }
    }

    pub fn with_phoneme(mut self, phoneme: Phoneme) -> Self {
        self.phoneme = Some(phoneme);
        self
    }

    pub fn with_previous_attempts(mut self, attempts: Vec<String>) -> Self {
        self.previous_attempts = attempts;
        self
    }

    pub fn is_exact_match(&self) -> bool {
        self.target_word.trim().to_lowercase() == self.recognized_word.trim().to_lowercase()
    }
}
