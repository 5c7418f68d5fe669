pub mod llm_provider;
pub mod progress;
pub mod pronunciation;
