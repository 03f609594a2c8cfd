//! Environment-driven configuration for the Analysis Engine, mirroring
//! `casparian_protocol::config::SystemConfig`'s struct-of-fields shape
//! (spec.md §6 "Environment variables consumed", SPEC_FULL.md §1).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nlq_llm::{AnthropicProvider, LlmProvider, MockLlmProvider, OpenAiProvider};

/// Which LLM backend to wire up. Absence of any provider key selects
/// `Mock`, never a hard-coded vendor default (spec.md Design Note b).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmModelType {
    Mock,
    OpenAi,
    Anthropic,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub llm_model_type: LlmModelType,
    pub llm_model_name: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub code_timeout: Duration,
    pub max_retries: u32,
    pub stdout_cap_bytes: usize,
    pub feedback_dir: PathBuf,
    pub fk_overlap_threshold: f64,
    pub table_row_cap: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_model_type: LlmModelType::Mock,
            llm_model_name: None,
            openai_api_key: None,
            anthropic_api_key: None,
            code_timeout: Duration::from_secs(30),
            max_retries: 3,
            stdout_cap_bytes: 64 * 1024,
            feedback_dir: PathBuf::from("./feedback_store"),
            fk_overlap_threshold: 0.8,
            table_row_cap: 25,
        }
    }
}

impl EngineConfig {
    /// Reads `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `LLM_MODEL_TYPE`,
    /// `LLM_MODEL_NAME`, `LLM_API_KEY`, `NLQ_CODE_TIMEOUT_SECS`,
    /// `NLQ_MAX_RETRIES`, `NLQ_STDOUT_CAP_BYTES`, `NLQ_FEEDBACK_DIR`,
    /// `NLQ_FK_OVERLAP_THRESHOLD`, `NLQ_TABLE_ROW_CAP`. `LLM_API_KEY` is
    /// a generic override applied to whichever provider is selected.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        let generic_key = std::env::var("LLM_API_KEY").ok();

        let llm_model_type = match std::env::var("LLM_MODEL_TYPE").ok().as_deref() {
            Some("openai") => LlmModelType::OpenAi,
            Some("anthropic") => LlmModelType::Anthropic,
            Some("mock") | None => {
                // No explicit type: infer from whichever key is present,
                // otherwise fall back to the mock gateway.
                if anthropic_api_key.is_some() || generic_key.is_some() && openai_api_key.is_none() {
                    if anthropic_api_key.is_some() {
                        LlmModelType::Anthropic
                    } else {
                        LlmModelType::Mock
                    }
                } else if openai_api_key.is_some() {
                    LlmModelType::OpenAi
                } else {
                    LlmModelType::Mock
                }
            }
            Some(_) => LlmModelType::Mock,
        };

        Self {
            llm_model_type,
            llm_model_name: std::env::var("LLM_MODEL_NAME").ok(),
            openai_api_key: openai_api_key.or_else(|| generic_key.clone()),
            anthropic_api_key: anthropic_api_key.or_else(|| generic_key.clone()),
            code_timeout: std::env::var("NLQ_CODE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.code_timeout),
            max_retries: std::env::var("NLQ_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            stdout_cap_bytes: std::env::var("NLQ_STDOUT_CAP_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.stdout_cap_bytes),
            feedback_dir: std::env::var("NLQ_FEEDBACK_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.feedback_dir),
            fk_overlap_threshold: std::env::var("NLQ_FK_OVERLAP_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fk_overlap_threshold),
            table_row_cap: std::env::var("NLQ_TABLE_ROW_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.table_row_cap),
        }
    }

    /// Build the configured [`LlmProvider`], falling back to the mock
    /// when the selected provider has no usable key (spec.md §4.7).
    pub fn build_llm_provider(&self) -> Arc<dyn LlmProvider> {
        match self.llm_model_type {
            LlmModelType::OpenAi => match &self.openai_api_key {
                Some(key) => Arc::new(OpenAiProvider::new(key.clone(), self.llm_model_name.clone())),
                None => Arc::new(MockLlmProvider::new()),
            },
            LlmModelType::Anthropic => match &self.anthropic_api_key {
                Some(key) => Arc::new(AnthropicProvider::new(key.clone(), self.llm_model_name.clone())),
                None => Arc::new(MockLlmProvider::new()),
            },
            LlmModelType::Mock => Arc::new(MockLlmProvider::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_selects_mock_provider() {
        let config = EngineConfig::default();
        assert_eq!(config.llm_model_type, LlmModelType::Mock);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.table_row_cap, 25);
    }
}
