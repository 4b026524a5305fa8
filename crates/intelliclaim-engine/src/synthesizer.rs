//! Decision Synthesizer: prompt the LLM once per question

use crate::config::EngineConfig;
use crate::error::SynthesisError;
use crate::prompt::{abridge, truncate_chars, PromptBuilder};
use intelliclaim_domain::traits::LlmProvider;
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns a question plus policy text into a raw LLM answer
pub struct Synthesizer<L> {
    llm_provider: Arc<L>,
    config: EngineConfig,
}

impl<L> Synthesizer<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a new Synthesizer
    pub fn new(llm_provider: L, config: EngineConfig) -> Self {
        Self::with_shared(Arc::new(llm_provider), config)
    }

    /// Create a Synthesizer around an already shared provider
    pub fn with_shared(llm_provider: Arc<L>, config: EngineConfig) -> Self {
        Self {
            llm_provider,
            config,
        }
    }

    /// Policy text as it will appear in the prompt
    pub fn prepare_policy(&self, policy_text: &str) -> String {
        let text = if self.config.abridge {
            abridge(policy_text, &self.config.section_keywords)
        } else {
            policy_text.to_string()
        };

        let capped = truncate_chars(&text, self.config.max_policy_chars);
        if capped.len() < text.len() {
            warn!(
                "Policy text truncated to {} chars for the prompt",
                self.config.max_policy_chars
            );
        }
        capped.to_string()
    }

    /// Full prompt for a question
    pub fn build_prompt(&self, query: &str, policy_text: &str) -> String {
        PromptBuilder::new(self.prepare_policy(policy_text), query.trim()).build()
    }

    /// Ask the LLM about one question
    ///
    /// The provider runs on the blocking pool under the configured
    /// timeout. No retries are attempted.
    pub async fn synthesize(&self, query: &str, policy_text: &str) -> Result<String, SynthesisError> {
        if query.trim().is_empty() {
            return Err(SynthesisError::EmptyQuery);
        }

        let prompt = self.build_prompt(query, policy_text);
        debug!("Prompt length: {} chars", prompt.len());

        let response = timeout(self.config.llm_timeout(), self.call_llm(prompt))
            .await
            .map_err(|_| SynthesisError::Timeout(self.config.llm_timeout_secs))??;

        info!("LLM answered with {} chars", response.len());
        Ok(response)
    }

    async fn call_llm(&self, prompt: String) -> Result<String, SynthesisError> {
        let llm = Arc::clone(&self.llm_provider);

        tokio::task::spawn_blocking(move || {
            llm.generate(&prompt)
                .map_err(|e| SynthesisError::Llm(e.to_string()))
        })
        .await
        .map_err(|e| SynthesisError::TaskJoin(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelliclaim_llm::MockProvider;
    use std::time::Duration;

    const POLICY: &str = "Preamble text. Coverage: inpatient care. Claims office hours.";

    #[tokio::test]
    async fn test_synthesize_returns_raw_text() {
        let mut llm = MockProvider::new("unused");
        llm.add_response("knee surgery", "**Claim:** APPROVED");
        let synthesizer = Synthesizer::new(llm, EngineConfig::default());

        let raw = synthesizer.synthesize("knee surgery in Pune", POLICY).await.unwrap();
        assert_eq!(raw, "**Claim:** APPROVED");
    }

    #[tokio::test]
    async fn test_empty_query_never_calls_llm() {
        let llm = Arc::new(MockProvider::new("x"));
        let synthesizer = Synthesizer::with_shared(Arc::clone(&llm), EngineConfig::default());

        let result = synthesizer.synthesize("   ", POLICY).await;
        assert_eq!(result, Err(SynthesisError::EmptyQuery));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_is_llm_error() {
        let mut llm = MockProvider::new("x");
        llm.add_error("dental");
        let synthesizer = Synthesizer::new(llm, EngineConfig::default());

        let result = synthesizer.synthesize("dental implant", POLICY).await;
        assert!(matches!(result, Err(SynthesisError::Llm(_))));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let llm = MockProvider::new("late").with_latency(Duration::from_millis(1500));
        let config = EngineConfig {
            llm_timeout_secs: 1,
            ..EngineConfig::default()
        };
        let synthesizer = Synthesizer::new(llm, config);

        let result = synthesizer.synthesize("anything", POLICY).await;
        assert_eq!(result, Err(SynthesisError::Timeout(1)));
    }

    #[test]
    fn test_prepare_policy_abridges_and_caps() {
        let llm = MockProvider::new("x");
        let synthesizer = Synthesizer::new(llm, EngineConfig::default());
        assert_eq!(
            synthesizer.prepare_policy(POLICY),
            "Coverage: inpatient care. Claims office hours."
        );

        let config = EngineConfig {
            abridge: false,
            max_policy_chars: 8,
            ..EngineConfig::default()
        };
        let synthesizer = Synthesizer::new(MockProvider::new("x"), config);
        assert_eq!(synthesizer.prepare_policy(POLICY), "Preamble");
    }

    #[test]
    fn test_prompt_embeds_trimmed_query() {
        let synthesizer = Synthesizer::new(MockProvider::new("x"), EngineConfig::default());
        let prompt = synthesizer.build_prompt("  cataract surgery  ", POLICY);
        assert!(prompt.contains("And this user query:\ncataract surgery\n"));
    }
}
