//! IntelliClaim LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `intelliclaim-domain`.
//! The decision synthesizer receives one of these at construction, so any
//! backend (or a test double) can be substituted without touching the
//! pipeline.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `GeminiProvider`: Google Generative Language API
//!
//! # Examples
//!
//! ```
//! use intelliclaim_llm::MockProvider;
//! use intelliclaim_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("**Claim:** APPROVED");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "**Claim:** APPROVED");
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod ollama;

use intelliclaim_domain::traits::LlmProvider as LlmProviderTrait;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider is missing credentials or settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Drive an HTTP future to completion from the synchronous trait method.
///
/// Callers invoke providers from a blocking thread (`spawn_blocking`), never
/// from an async worker, so a private current-thread runtime is safe here.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, LlmError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Rules are checked in insertion order; the first rule whose fragment
/// appears anywhere in the prompt decides the reply. Prompts that match
/// no rule get the default response.
///
/// # Examples
///
/// ```
/// use intelliclaim_llm::MockProvider;
/// use intelliclaim_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("knee surgery", "**Claim:** APPROVED");
/// provider.add_error("dental");
///
/// assert_eq!(provider.generate("Q: knee surgery in Pune").unwrap(), "**Claim:** APPROVED");
/// assert!(provider.generate("Q: dental implants").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    call_count: Arc<Mutex<usize>>,
    latency: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            latency: None,
        }
    }

    /// Respond with `response` whenever the prompt contains `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.rules
            .lock()
            .unwrap()
            .push((fragment.into(), MockReply::Text(response.into())));
    }

    /// Fail whenever the prompt contains `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.rules.lock().unwrap().push((fragment.into(), MockReply::Fail));
    }

    /// Sleep this long before every reply
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let reply = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_matches_fragments() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("say hello there").unwrap(), "world");
        assert_eq!(provider.generate("the foo case").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_first_rule_wins() {
        let mut provider = MockProvider::default();
        provider.add_response("surgery", "first");
        provider.add_response("knee", "second");

        assert_eq!(provider.generate("knee surgery").unwrap(), "first");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("a bad prompt here");
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let mut provider2 = provider1.clone();
        provider2.add_error("boom");

        provider1.generate("test").unwrap();
        assert_eq!(provider2.call_count(), 1);
        assert!(provider1.generate("boom").is_err());
    }
}
