use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{AIFeedback, ConfidenceLevel, PronunciationContext};
use crate::services::llm_provider::LLMError;

const EXCELLENT_MIN: u8 = 90;
const GOOD_MIN: u8 = 70;
const NEEDS_PRACTICE_MIN: u8 = 50;
const PERSISTENCE_ATTEMPTS: u32 = 2;

/// Single-turn text generation used by the remote feedback strategy.
pub trait TextGenerator: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, LLMError>> + Send;
}

#[derive(Debug, Error)]
pub enum FeedbackParseError {
    #[error("reply is empty")]
    Empty,
    #[error("no JSON object in reply")]
    NoJsonObject,
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Picks between the remote strategy and local rules. Never fails: every
/// remote problem degrades to [`deterministic_feedback`].
pub struct FeedbackClassifier<G> {
    generator: Option<G>,
}

impl<G: TextGenerator> FeedbackClassifier<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    pub fn deterministic_only() -> Self {
        Self { generator: None }
    }

    pub fn remote_available(&self) -> bool {
        self.generator.as_ref().is_some_and(|g| g.is_available())
    }

    pub async fn classify(&self, ctx: &PronunciationContext) -> AIFeedback {
        let fallback = deterministic_feedback(ctx);

        let Some(generator) = self.generator.as_ref().filter(|g| g.is_available()) else {
            debug!(target_word = %ctx.target_word, "remote feedback unavailable, using local rules");
            return fallback;
        };

        let prompt = build_prompt(ctx);
        match generator.generate(&prompt).await {
            Ok(raw) => match parse_feedback(&raw, &fallback) {
                Ok(feedback) => feedback,
                Err(e) => {
                    warn!(error = %e, attempt = ctx.attempt_number, "unusable feedback reply, falling back");
                    fallback
                }
            },
            Err(e) => {
                warn!(error = %e, attempt = ctx.attempt_number, "feedback request failed, falling back");
                fallback
            }
        }
    }
}

pub fn confidence_for(ctx: &PronunciationContext) -> ConfidenceLevel {
    let overall = ctx.score.overall;
    if ctx.is_exact_match() || overall >= EXCELLENT_MIN {
        ConfidenceLevel::Excellent
    } else if overall >= GOOD_MIN {
        ConfidenceLevel::Good
    } else if overall >= NEEDS_PRACTICE_MIN {
        ConfidenceLevel::NeedsPractice
    } else {
        ConfidenceLevel::KeepTrying
    }
}

pub fn deterministic_feedback(ctx: &PronunciationContext) -> AIFeedback {
    let target = ctx.target_word.trim();
    let heard = ctx.recognized_word.as_str();
    let phoneme = ctx.phoneme.as_ref();
    let level = confidence_for(ctx);

    match level {
        ConfidenceLevel::Excellent => AIFeedback {
            overall_feedback: format!("Amazing! I heard \"{heard}\". You said \"{target}\" perfectly!"),
            encouragement: "You're a phonics superstar!".to_string(),
            specific_tips: vec![
                "Your sounds were clear and correct.".to_string(),
                "You've mastered this word, so try using it in a sentence.".to_string(),
            ],
            practice_recommendation: "Move on to the next word, or try a trickier one!".to_string(),
            confidence_level: level,
        },
        ConfidenceLevel::Good => {
            let specific_tips = match phoneme {
                Some(p) => {
                    let mut tips: Vec<String> = p.first_tip().map(str::to_string).into_iter().collect();
                    tips.push(format!("Remember: {}.", p.description));
                    tips
                }
                None => vec![
                    "Slow down a little and say each sound clearly.".to_string(),
                    "Listen to the word once more, then say it back.".to_string(),
                ],
            };
            AIFeedback {
                overall_feedback: format!("Great job! I heard \"{heard}\". You're really close to \"{target}\"."),
                encouragement: "You're doing so well. Keep it up!".to_string(),
                specific_tips,
                practice_recommendation: format!("Say \"{target}\" two more times to make it perfect."),
                confidence_level: level,
            }
        }
        ConfidenceLevel::NeedsPractice => {
            let specific_tips = match phoneme {
                Some(p) => {
                    let mut tips = vec![format!("Focus on the \"{}\" sound: {}.", p.symbol, p.description)];
                    if let Some(tip) = p.first_tip() {
                        tips.push(tip.to_string());
                    }
                    tips
                }
                None => vec![
                    "Break the word into its sounds and say each one slowly.".to_string(),
                    "Then blend the sounds together, faster each time.".to_string(),
                ],
            };
            AIFeedback {
                overall_feedback: format!("Good try! I heard \"{heard}\". Let's work on \"{target}\" together."),
                encouragement: "Every try makes you better!".to_string(),
                specific_tips,
                practice_recommendation: format!("Listen to \"{target}\" again, then practice it three times."),
                confidence_level: level,
            }
        }
        ConfidenceLevel::KeepTrying => {
            let overall_feedback = if heard.trim().is_empty() {
                format!("I didn't catch that. Let's try saying \"{target}\" again!")
            } else {
                format!("Nice effort! I heard \"{heard}\". Let's practice \"{target}\" step by step.")
            };
            let mut specific_tips = match phoneme {
                Some(p) => vec![
                    format!("Listen carefully for the \"{}\" sound.", p.symbol),
                    format!("It is {}.", p.description),
                    format!("In sound symbols it is written /{}/.", p.ipa),
                ],
                None => vec![
                    "Try saying the word in small chunks.".to_string(),
                    "Listen to the word first, then copy what you hear.".to_string(),
                ],
            };
            if ctx.attempt_number > PERSISTENCE_ATTEMPTS {
                specific_tips.push(format!(
                    "You've tried {} times. Sticking with it is how readers grow!",
                    ctx.attempt_number
                ));
            }
            AIFeedback {
                overall_feedback,
                encouragement: "Don't give up, you can do it!".to_string(),
                specific_tips,
                practice_recommendation: format!(
                    "Listen to \"{target}\" slowly, then say one sound at a time."
                ),
                confidence_level: level,
            }
        }
    }
}

pub fn build_prompt(ctx: &PronunciationContext) -> String {
    let score = &ctx.score;
    let mut prompt = format!(
        "You are a warm, encouraging phonics tutor for young children.\n\
         A child is practicing pronunciation.\n\
         Target word: \"{}\"\n\
         What the child said: \"{}\"\n\
         Attempt number: {}\n\
         Scores (0-100): overall {}, accuracy {}, completeness {}, similarity {}\n",
        ctx.target_word.trim(),
        ctx.recognized_word.trim(),
        ctx.attempt_number,
        score.overall,
        score.accuracy,
        score.completeness,
        score.similarity,
    );

    if let Some(p) = &ctx.phoneme {
        prompt.push_str(&format!(
            "Focus sound: \"{}\" /{}/ ({})\nAbout this sound: {}\n",
            p.symbol, p.ipa, p.category, p.description
        ));
        if !p.tips.is_empty() {
            prompt.push_str(&format!("Teaching tips: {}\n", p.tips.join("; ")));
        }
    }

    if !ctx.previous_attempts.is_empty() {
        prompt.push_str(&format!(
            "Earlier attempts: {}\n",
            ctx.previous_attempts
                .iter()
                .map(|a| format!("\"{a}\""))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    prompt.push_str(
        "\nReply with only a JSON object with these keys:\n\
         {\"overallFeedback\": string, \"encouragement\": string, \
         \"specificTips\": [string], \"practiceRecommendation\": string, \
         \"confidenceLevel\": \"excellent\" | \"good\" | \"needs_practice\" | \"keep_trying\"}\n\
         Use short, simple sentences a five-year-old understands.",
    );
    prompt
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeedback {
    overall_feedback: Option<String>,
    encouragement: Option<String>,
    specific_tips: Option<Vec<String>>,
    practice_recommendation: Option<String>,
    confidence_level: Option<String>,
}

/// Parses a model reply; fields it leaves out come from `fallback`.
pub fn parse_feedback(raw: &str, fallback: &AIFeedback) -> Result<AIFeedback, FeedbackParseError> {
    if raw.trim().is_empty() {
        return Err(FeedbackParseError::Empty);
    }
    let json = extract_json_object(raw).ok_or(FeedbackParseError::NoJsonObject)?;
    let parsed: RawFeedback = serde_json::from_str(json)?;

    let tips: Vec<String> = parsed
        .specific_tips
        .unwrap_or_default()
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .collect();

    Ok(AIFeedback {
        overall_feedback: non_empty(parsed.overall_feedback)
            .unwrap_or_else(|| fallback.overall_feedback.clone()),
        encouragement: non_empty(parsed.encouragement)
            .unwrap_or_else(|| fallback.encouragement.clone()),
        specific_tips: if tips.is_empty() {
            fallback.specific_tips.clone()
        } else {
            tips
        },
        practice_recommendation: non_empty(parsed.practice_recommendation)
            .unwrap_or_else(|| fallback.practice_recommendation.clone()),
        confidence_level: parsed
            .confidence_level
            .as_deref()
            .and_then(ConfidenceLevel::parse)
            .unwrap_or(fallback.confidence_level),
    })
}

/// Returns the outermost `{...}` span of a reply, ignoring any reasoning
/// preamble closed by `</think>`.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let s = match raw.rfind("</think>") {
        Some(end) => &raw[end + "</think>".len()..],
        None => raw,
    };
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Tracks the newest attempt so a slow reply for an older attempt can be
/// dropped instead of overwriting fresher feedback.
#[derive(Debug, Default)]
pub struct AttemptGate {
    latest: AtomicU32,
}

impl AttemptGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, attempt: u32) {
        self.latest.fetch_max(attempt, Ordering::AcqRel);
    }

    pub fn latest(&self) -> u32 {
        self.latest.load(Ordering::Acquire)
    }

    pub fn accept(&self, attempt: u32) -> bool {
        attempt == self.latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phonics::phoneme;
    use crate::phonics::types::PronunciationScore;

    fn ctx_with_overall(target: &str, heard: &str, overall: u8, attempt: u32) -> PronunciationContext {
        let score = PronunciationScore {
            overall,
            accuracy: overall,
            completeness: overall,
            similarity: overall,
        };
        PronunciationContext::new(target, heard, score, attempt)
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LLMError> {
            Err(LLMError::NotConfigured("LLM_API_KEY"))
        }
    }

    struct CannedGenerator(&'static str);

    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LLMError> {
            Ok(self.0.to_string())
        }
    }

    struct UnavailableGenerator;

    impl TextGenerator for UnavailableGenerator {
        fn is_available(&self) -> bool {
            false
        }

        async fn generate(&self, _prompt: &str) -> Result<String, LLMError> {
            Ok("{\"overallFeedback\":\"should not be used\"}".to_string())
        }
    }

    #[test]
    fn tiers_follow_overall_score() {
        assert_eq!(confidence_for(&ctx_with_overall("cat", "cap", 95, 1)), ConfidenceLevel::Excellent);
        assert_eq!(confidence_for(&ctx_with_overall("cat", "cap", 90, 1)), ConfidenceLevel::Excellent);
        assert_eq!(confidence_for(&ctx_with_overall("cat", "cap", 89, 1)), ConfidenceLevel::Good);
        assert_eq!(confidence_for(&ctx_with_overall("cat", "cap", 70, 1)), ConfidenceLevel::Good);
        assert_eq!(confidence_for(&ctx_with_overall("cat", "cap", 50, 1)), ConfidenceLevel::NeedsPractice);
        assert_eq!(confidence_for(&ctx_with_overall("cat", "cap", 45, 1)), ConfidenceLevel::KeepTrying);
    }

    #[test]
    fn exact_match_short_circuits_to_excellent() {
        let ctx = ctx_with_overall("Cat", " cat", 10, 1);
        assert_eq!(confidence_for(&ctx), ConfidenceLevel::Excellent);
    }

    #[test]
    fn same_context_always_same_tier() {
        let ctx = ctx_with_overall("ship", "sip", 62, 2);
        let first = deterministic_feedback(&ctx);
        let second = deterministic_feedback(&ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn recognized_word_keeps_surrounding_spaces() {
        let feedback = deterministic_feedback(&ctx_with_overall("ship", " sip ", 75, 1));
        assert!(feedback.overall_feedback.contains("\" sip \""), "{}", feedback.overall_feedback);

        let blank = deterministic_feedback(&ctx_with_overall("ship", "   ", 0, 1));
        assert!(blank.overall_feedback.contains("didn't catch that"));
    }

    #[test]
    fn recognized_word_is_quoted_verbatim() {
        for overall in [95, 75, 55, 20] {
            let feedback = deterministic_feedback(&ctx_with_overall("ship", "sip", overall, 1));
            assert!(feedback.overall_feedback.contains("\"sip\""), "{overall}: {}", feedback.overall_feedback);
        }
    }

    #[test]
    fn empty_recognition_uses_didnt_catch_phrasing() {
        let feedback = deterministic_feedback(&ctx_with_overall("ship", "", 0, 1));
        assert_eq!(feedback.confidence_level, ConfidenceLevel::KeepTrying);
        assert!(feedback.overall_feedback.contains("didn't catch that"));
    }

    #[test]
    fn persistence_tip_after_second_attempt() {
        let second = deterministic_feedback(&ctx_with_overall("ship", "sip", 20, 2));
        let third = deterministic_feedback(&ctx_with_overall("ship", "sip", 20, 3));
        assert_eq!(third.specific_tips.len(), second.specific_tips.len() + 1);
        assert!(third.specific_tips.last().unwrap().contains("3 times"));
    }

    #[test]
    fn phoneme_drives_tips() {
        let sh = phoneme::find("sh").unwrap();

        let good = deterministic_feedback(&ctx_with_overall("ship", "sip", 75, 1).with_phoneme(sh.clone()));
        assert_eq!(good.specific_tips[0], sh.tips[0]);
        assert!(good.specific_tips[1].contains(&sh.description));

        let practice = deterministic_feedback(&ctx_with_overall("ship", "sip", 55, 1).with_phoneme(sh.clone()));
        assert!(practice.specific_tips[0].contains("\"sh\""));
        assert_eq!(practice.specific_tips[1], sh.tips[0]);

        let trying = deterministic_feedback(&ctx_with_overall("ship", "sip", 30, 1).with_phoneme(sh.clone()));
        assert!(trying.specific_tips.iter().any(|t| t.contains("/ʃ/")));
    }

    #[test]
    fn prompt_embeds_context() {
        let ctx = ctx_with_overall("ship", "sip", 30, 2)
            .with_phoneme(phoneme::find("sh").unwrap())
            .with_previous_attempts(vec!["sit".into()]);
        let prompt = build_prompt(&ctx);
        assert!(prompt.contains("Target word: \"ship\""));
        assert!(prompt.contains("What the child said: \"sip\""));
        assert!(prompt.contains("Attempt number: 2"));
        assert!(prompt.contains("overall 30"));
        assert!(prompt.contains("/ʃ/"));
        assert!(prompt.contains("\"sit\""));
    }

    #[test]
    fn extract_handles_fences_and_think_blocks() {
        let raw = "<think>{\"draft\":1}</think>\n```json\n{\"a\": {\"b\": 1}}\n```";
        assert_eq!(extract_json_object(raw), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn parse_backfills_missing_fields() {
        let fallback = deterministic_feedback(&ctx_with_overall("ship", "sip", 55, 1));
        let raw = r#"Sure! {"overallFeedback": "Nearly there!", "specificTips": [], "confidenceLevel": "superb"}"#;
        let parsed = parse_feedback(raw, &fallback).unwrap();
        assert_eq!(parsed.overall_feedback, "Nearly there!");
        assert_eq!(parsed.encouragement, fallback.encouragement);
        assert_eq!(parsed.specific_tips, fallback.specific_tips);
        assert_eq!(parsed.practice_recommendation, fallback.practice_recommendation);
        assert_eq!(parsed.confidence_level, fallback.confidence_level);
    }

    #[test]
    fn parse_rejects_garbage() {
        let fallback = deterministic_feedback(&ctx_with_overall("ship", "sip", 55, 1));
        assert!(matches!(parse_feedback("   ", &fallback), Err(FeedbackParseError::Empty)));
        assert!(matches!(parse_feedback("hello", &fallback), Err(FeedbackParseError::NoJsonObject)));
        assert!(matches!(parse_feedback("{not json}", &fallback), Err(FeedbackParseError::Json(_))));
    }

    #[tokio::test]
    async fn failing_remote_matches_local_rules() {
        let ctx = ctx_with_overall("ship", "sip", 45, 3);
        let classifier = FeedbackClassifier::new(FailingGenerator);
        assert_eq!(classifier.classify(&ctx).await, deterministic_feedback(&ctx));
    }

    #[tokio::test]
    async fn unusable_reply_matches_local_rules() {
        let ctx = ctx_with_overall("ship", "sip", 45, 1);
        let classifier = FeedbackClassifier::new(CannedGenerator("I think you did great"));
        assert_eq!(classifier.classify(&ctx).await, deterministic_feedback(&ctx));
    }

    #[tokio::test]
    async fn unavailable_generator_is_skipped() {
        let ctx = ctx_with_overall("ship", "sip", 75, 1);
        let classifier = FeedbackClassifier::new(UnavailableGenerator);
        assert!(!classifier.remote_available());
        assert_eq!(classifier.classify(&ctx).await, deterministic_feedback(&ctx));
    }

    #[tokio::test]
    async fn remote_reply_is_used() {
        let ctx = ctx_with_overall("ship", "sip", 55, 1);
        let classifier = FeedbackClassifier::new(CannedGenerator(
            r#"{"overallFeedback":"I heard \"sip\"!","encouragement":"Yay","specificTips":["Push your lips out"],"practiceRecommendation":"Try ship again","confidenceLevel":"good"}"#,
        ));
        let feedback = classifier.classify(&ctx).await;
        assert_eq!(feedback.overall_feedback, "I heard \"sip\"!");
        assert_eq!(feedback.specific_tips, vec!["Push your lips out".to_string()]);
        assert_eq!(feedback.confidence_level, ConfidenceLevel::Good);
    }

    #[test]
    fn stale_attempts_are_rejected() {
        let gate = AttemptGate::new();
        gate.begin(1);
        gate.begin(2);
        assert!(!gate.accept(1));
        assert!(gate.accept(2));
        gate.begin(1);
        assert_eq!(gate.latest(), 2);
    }
}
