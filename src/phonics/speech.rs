//! Capability interfaces for speech input and output.
//!
//! Recognition and synthesis live on the client device. These traits let the
//! scoring path run against plain strings, with the device behind an object
//! that has an explicit `open`/`close` lifecycle.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::phoneme::Phoneme;

const DEFAULT_LANGUAGE: &str = "en-US";
// Slightly slower than conversational speech for young learners.
const DEFAULT_RATE: f32 = 0.9;
const DEFAULT_PITCH: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("speech capability is not open")]
    NotOpen,
    #[error("speech is not supported on this platform")]
    NotSupported,
    #[error("failed to start speech capability: {0}")]
    InitFailed(String),
    #[error("speech input ended without a final result")]
    NoFinalResult,
    #[error("speech output failed: {0}")]
    SpeakFailed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub transcript: String,
    pub confidence: f32,
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub language: String,
    pub interim_results: bool,
    pub max_alternatives: u8,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            interim_results: true,
            max_alternatives: 3,
        }
    }
}

pub trait SpeechRecognizer {
    fn open(&mut self, config: &RecognitionConfig) -> Result<(), SpeechError>;

    /// Next recognition event, or `Ok(None)` once the input has ended.
    fn next_result(&mut self) -> Result<Option<RecognitionResult>, SpeechError>;

    fn close(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            rate: DEFAULT_RATE,
            pitch: DEFAULT_PITCH,
            voice: None,
        }
    }

    /// Spoken introduction of a sound: its description and an example word.
    pub fn for_phoneme(phoneme: &Phoneme) -> Self {
        let text = match phoneme.example_words.first() {
            Some(example) => format!("This is {}. Listen: {example}.", phoneme.description),
            None => format!("This is {}.", phoneme.description),
        };
        Self::new(text)
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

pub trait SpeechSynthesizer {
    fn open(&mut self) -> Result<(), SpeechError>;

    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;

    fn close(&mut self);
}

/// Opens `recognizer`, reads until the first final result and closes it
/// again whatever the outcome. Interim results are ignored.
pub fn capture_transcript<R: SpeechRecognizer + ?Sized>(
    recognizer: &mut R,
    config: &RecognitionConfig,
) -> Result<String, SpeechError> {
    recognizer.open(config)?;
    let outcome = drain_until_final(recognizer);
    recognizer.close();
    outcome
}

fn drain_until_final<R: SpeechRecognizer + ?Sized>(recognizer: &mut R) -> Result<String, SpeechError> {
    while let Some(result) = recognizer.next_result()? {
        if result.is_final {
            debug!(confidence = result.confidence, "final transcript received");
            return Ok(result.transcript.trim().to_string());
        }
    }
    Err(SpeechError::NoFinalResult)
}
