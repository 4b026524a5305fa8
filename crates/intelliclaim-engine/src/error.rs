//! Error types for the decision engine

use thiserror::Error;

/// Errors raised while obtaining a raw answer from the LLM
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    /// Query was empty or whitespace
    #[error("Query must not be empty")]
    EmptyQuery,

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// LLM call exceeded its time budget
    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    /// The blocking LLM task panicked or was cancelled
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

/// Errors that can fail a decision request
#[derive(Error, Debug)]
pub enum EngineError {
    /// No policy text available to decide against
    #[error("Policy text unavailable: {0}")]
    PolicyUnavailable(String),

    /// Synthesis failed
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Clause or document store error
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
