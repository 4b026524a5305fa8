//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] intelliclaim_store::StoreError),

    /// Ingestion error
    #[error("Ingestion failed: {0}")]
    Ingest(#[from] intelliclaim_ingest::IngestError),

    /// Decision engine error
    #[error("Decision failed: {0}")]
    Engine(#[from] intelliclaim_engine::EngineError),

    /// LLM provider setup error
    #[error("LLM provider error: {0}")]
    Llm(#[from] intelliclaim_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
