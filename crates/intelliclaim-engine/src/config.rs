//! Configuration for the decision engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the decision engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum time for a single LLM call (seconds)
    pub llm_timeout_secs: u64,

    /// Reduce the policy text to its keyword sections before prompting
    pub abridge: bool,

    /// Section keywords used for abridgement, in output order
    pub section_keywords: Vec<String>,

    /// Maximum policy characters sent to the LLM
    pub max_policy_chars: usize,

    /// Minimum overlap score a clause must exceed to be cited
    pub match_threshold: f64,

    /// Characters of clause body kept in a citation excerpt
    pub excerpt_chars: usize,

    /// Maximum questions in flight during a batch
    pub batch_concurrency: usize,

    /// Currency symbol used in the justification narrative
    pub currency_symbol: String,
}

impl EngineConfig {
    /// Get the LLM timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.llm_timeout_secs == 0 {
            return Err("llm_timeout_secs must be greater than 0".to_string());
        }
        if self.max_policy_chars == 0 {
            return Err("max_policy_chars must be greater than 0".to_string());
        }
        if !(0.0..1.0).contains(&self.match_threshold) {
            return Err(format!(
                "match_threshold must be in [0, 1), got {}",
                self.match_threshold
            ));
        }
        if self.excerpt_chars == 0 {
            return Err("excerpt_chars must be greater than 0".to_string());
        }
        if self.batch_concurrency == 0 {
            return Err("batch_concurrency must be greater than 0".to_string());
        }
        if self.section_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err("section_keywords cannot contain blank entries".to_string());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_timeout_secs: 120,
            abridge: true,
            section_keywords: vec![
                "Coverage".to_string(),
                "Exclusions".to_string(),
                "Waiting Period".to_string(),
            ],
            max_policy_chars: 100_000,
            match_threshold: 0.3,
            excerpt_chars: 300,
            batch_concurrency: 4,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl EngineConfig {
    /// Fast preset: short timeout, smaller prompts, wider batches
    pub fn fast() -> Self {
        Self {
            llm_timeout_secs: 30,
            max_policy_chars: 20_000,
            batch_concurrency: 8,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
