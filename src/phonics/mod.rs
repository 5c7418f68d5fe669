pub mod feedback;
pub mod lesson;
pub mod phoneme;
pub mod scoring;
pub mod similarity;
pub mod speech;
pub mod types;

pub use feedback::{deterministic_feedback, FeedbackClassifier, TextGenerator};
pub use scoring::{score, score_with, ScoringConfig};
pub use similarity::similarity;
pub use types::{AIFeedback, ConfidenceLevel, PronunciationContext, PronunciationScore};
