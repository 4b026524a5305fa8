//! LLM provider selection.

use crate::config::{Config, ProviderKind};
use crate::error::Result;
use intelliclaim_domain::traits::LlmProvider;
use intelliclaim_llm::{gemini, ollama, GeminiProvider, LlmError, MockProvider, OllamaProvider};
use tracing::info;

/// Answer returned by the offline mock provider.
pub const MOCK_ANSWER: &str = "\
**Claim:** REJECTED
**Reason:** No language model is configured; this is an offline placeholder answer.
**Relevant Clauses:**
- Coverage
**Confidence:** Low
**Estimated Amount:** 0
**Age:** N/A
**Gender:** N/A
**Procedure:** N/A
**Location:** N/A
**Policy Age:** N/A
";

/// The configured LLM backend.
pub enum Provider {
    /// Canned offline answers
    Mock(MockProvider),
    /// Local Ollama server
    Ollama(OllamaProvider),
    /// Google Gemini
    Gemini(GeminiProvider),
}

impl Provider {
    /// Build the provider named in the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config.engine.llm_timeout();
        let model = config.llm.model.clone();

        let provider = match config.llm.provider {
            ProviderKind::Mock => Provider::Mock(MockProvider::new(MOCK_ANSWER)),
            ProviderKind::Ollama => {
                let endpoint = config
                    .llm
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| ollama::DEFAULT_ENDPOINT.to_string());
                let model = model.unwrap_or_else(|| "llama3".to_string());
                Provider::Ollama(OllamaProvider::with_timeout(endpoint, model, timeout)?)
            }
            ProviderKind::Gemini => {
                let model = model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());
                let provider = GeminiProvider::from_env(model, timeout)?;
                match &config.llm.endpoint {
                    Some(base_url) => Provider::Gemini(provider.with_base_url(base_url.clone())),
                    None => Provider::Gemini(provider),
                }
            }
        };

        info!("Using {} provider", provider.name());
        Ok(provider)
    }

    /// Short provider name.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Mock(_) => "mock",
            Provider::Ollama(_) => "ollama",
            Provider::Gemini(_) => "gemini",
        }
    }
}

impl LlmProvider for Provider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> std::result::Result<String, Self::Error> {
        match self {
            Provider::Mock(p) => LlmProvider::generate(p, prompt),
            Provider::Ollama(p) => LlmProvider::generate(p, prompt),
            Provider::Gemini(p) => LlmProvider::generate(p, prompt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelliclaim_engine::parse_response;
    use intelliclaim_domain::Verdict;

    #[test]
    fn test_mock_provider_from_config() {
        let mut config = Config::default();
        config.llm.provider = ProviderKind::Mock;

        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(provider.name(), "mock");
        assert_eq!(provider.generate("anything").unwrap(), MOCK_ANSWER);
    }

    #[test]
    fn test_ollama_provider_from_config() {
        let mut config = Config::default();
        config.llm.provider = ProviderKind::Ollama;
        config.llm.endpoint = Some("http://127.0.0.1:11434".to_string());

        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_mock_answer_follows_field_contract() {
        let parsed = parse_response(MOCK_ANSWER);
        assert_eq!(parsed.verdict(), Verdict::Rejected);
        assert_eq!(parsed.confidence(), 0.4);
        assert_eq!(parsed.mentions(), ["Coverage"]);
    }
}
