use serde::{Deserialize, Serialize};

use crate::phonics::feedback::{FeedbackClassifier, TextGenerator};
use crate::phonics::phoneme::{self, Phoneme};
use crate::phonics::scoring::{score_with, ScoringConfig};
use crate::phonics::types::{AIFeedback, PronunciationContext, PronunciationScore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRequest {
    pub target_word: String,
    #[serde(default)]
    pub recognized_word: String,
    #[serde(default)]
    pub phoneme: Option<Phoneme>,
    #[serde(default)]
    pub phoneme_symbol: Option<String>,
    #[serde(default = "first_attempt")]
    pub attempt_number: u32,
    #[serde(default)]
    pub previous_attempts: Vec<String>,
}

fn first_attempt() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptEvaluation {
    pub attempt_number: u32,
    pub score: PronunciationScore,
    pub feedback: AIFeedback,
}

impl AttemptRequest {
    /// An inline phoneme wins over a catalog symbol. Unknown symbols are
    /// ignored.
    pub fn resolve_phoneme(&self) -> Option<Phoneme> {
        self.phoneme
            .clone()
            .or_else(|| self.phoneme_symbol.as_deref().and_then(phoneme::find))
    }

    pub fn into_context(self, config: &ScoringConfig) -> PronunciationContext {
        let score = score_with(&self.target_word, &self.recognized_word, config);
        let phoneme = self.resolve_phoneme();
        let mut ctx = PronunciationContext::new(self.target_word, self.recognized_word, score, self.attempt_number)
            .with_previous_attempts(self.previous_attempts);
        ctx.phoneme = phoneme;
        ctx
    }
}

pub async fn evaluate_attempt<G: TextGenerator>(
    classifier: &FeedbackClassifier<G>,
    config: &ScoringConfig,
    request: AttemptRequest,
    use_remote: bool,
) -> AttemptEvaluation {
    let ctx = request.into_context(config);
    let feedback = if use_remote {
        classifier.classify(&ctx).await
    } else {
        crate::phonics::feedback::deterministic_feedback(&ctx)
    };
    AttemptEvaluation {
        attempt_number: ctx.attempt_number,
        score: ctx.score,
        feedback,
    }
}
