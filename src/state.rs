use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::phonics::feedback::FeedbackClassifier;
use crate::phonics::scoring::ScoringConfig;
use crate::services::llm_provider::LLMProvider;

#[derive(Debug)]
pub struct RuntimeConfig {
    pub llm_enabled: AtomicBool,
    settings_token: Option<String>,
}

impl RuntimeConfig {
    pub fn new(llm_enabled: bool) -> Self {
        Self {
            llm_enabled: AtomicBool::new(llm_enabled),
            settings_token: None,
        }
    }

    /// Requires `token` on every settings change.
    pub fn with_settings_token(mut self, token: Option<String>) -> Self {
        self.settings_token = token.filter(|t| !t.is_empty());
        self
    }

    /// No token configured means settings changes are open.
    pub fn may_change_settings(&self, presented: Option<&str>) -> bool {
        match self.settings_token.as_deref() {
            None => true,
            Some(expected) => presented == Some(expected),
        }
    }

    pub fn is_llm_enabled(&self) -> bool {
        self.llm_enabled.load(Ordering::Relaxed)
    }

    pub fn set_llm_enabled(&self, enabled: bool) {
        self.llm_enabled.store(enabled, Ordering::Relaxed);
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(true)
    }
}

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    classifier: Arc<FeedbackClassifier<LLMProvider>>,
    scoring: Arc<ScoringConfig>,
    runtime: Arc<RuntimeConfig>,
}

impl AppState {
    pub fn new(classifier: FeedbackClassifier<LLMProvider>, scoring: ScoringConfig, runtime: RuntimeConfig) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            classifier: Arc::new(classifier),
            scoring: Arc::new(scoring),
            runtime: Arc::new(runtime),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FeedbackClassifier::new(LLMProvider::from_env()),
            config.scoring.clone(),
            RuntimeConfig::new(config.llm_feedback_enabled).with_settings_token(config.settings_token.clone()),
        )
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn classifier(&self) -> &FeedbackClassifier<LLMProvider> {
        &self.classifier
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn runtime(&self) -> &RuntimeConfig {
        &self.runtime
    }
}
