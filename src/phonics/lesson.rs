use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progression::reducer::ProgressEvent;

const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonPhase {
    Listen,
    Practice,
    Play,
    Assess,
    Completed,
}

impl LessonPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            LessonPhase::Listen => "listen",
            LessonPhase::Practice => "practice",
            LessonPhase::Play => "play",
            LessonPhase::Assess => "assess",
            LessonPhase::Completed => "completed",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            LessonPhase::Listen => Some(LessonPhase::Practice),
            LessonPhase::Practice => Some(LessonPhase::Play),
            LessonPhase::Play => Some(LessonPhase::Assess),
            LessonPhase::Assess | LessonPhase::Completed => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            LessonPhase::Practice => Some(LessonPhase::Listen),
            LessonPhase::Play => Some(LessonPhase::Practice),
            LessonPhase::Assess => Some(LessonPhase::Play),
            LessonPhase::Listen | LessonPhase::Completed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTransition {
    pub from: LessonPhase,
    pub to: LessonPhase,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LessonError {
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: LessonPhase, to: LessonPhase },
    #[error("no phase {direction} {from:?}")]
    NoAdjacentPhase {
        from: LessonPhase,
        direction: &'static str,
    },
    #[error("assessment score {0} is out of range")]
    ScoreOutOfRange(u8),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonFlow {
    pub lesson_id: String,
    pub phase: LessonPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_score: Option<u8>,
    #[serde(default)]
    pub history: Vec<PhaseTransition>,
}

impl LessonFlow {
    pub fn new(lesson_id: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            phase: LessonPhase::Listen,
            assessment_score: None,
            history: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.phase == LessonPhase::Completed
    }

    pub fn can_transition_to(&self, target: LessonPhase) -> bool {
        self.phase.next() == Some(target) || self.phase.previous() == Some(target)
    }

    pub fn advance(&mut self) -> Result<LessonPhase, LessonError> {
        let target = self.phase.next().ok_or(LessonError::NoAdjacentPhase {
            from: self.phase,
            direction: "after",
        })?;
        self.transition_to(target)?;
        Ok(target)
    }

    pub fn back(&mut self) -> Result<LessonPhase, LessonError> {
        let target = self.phase.previous().ok_or(LessonError::NoAdjacentPhase {
            from: self.phase,
            direction: "before",
        })?;
        self.transition_to(target)?;
        Ok(target)
    }

    /// Finishes the assessment and returns the event to feed the progress
    /// reducer.
    pub fn complete(&mut self, score: u8, on: NaiveDate) -> Result<ProgressEvent, LessonError> {
        if score > 100 {
            return Err(LessonError::ScoreOutOfRange(score));
        }
        if self.phase != LessonPhase::Assess {
            return Err(LessonError::InvalidTransition {
                from: self.phase,
                to: LessonPhase::Completed,
            });
        }
        self.record(LessonPhase::Completed);
        self.assessment_score = Some(score);
        Ok(ProgressEvent::LessonCompleted {
            lesson_id: self.lesson_id.clone(),
            assessment_score: score,
            on,
        })
    }

    fn transition_to(&mut self, target: LessonPhase) -> Result<(), LessonError> {
        if !self.can_transition_to(target) {
            return Err(LessonError::InvalidTransition {
                from: self.phase,
                to: target,
            });
        }
        self.record(target);
        Ok(())
    }

    fn record(&mut self, target: LessonPhase) {
        self.history.push(PhaseTransition {
            from: self.phase,
            to: target,
            at: Utc::now(),
        });
        self.phase = target;

        if self.history.len() > HISTORY_LIMIT {
            let extra = self.history.len() - HISTORY_LIMIT;
            self.history.drain(0..extra);
        }
    }
}
