//! IntelliClaim Decision Engine
//!
//! Answers a claim question against the ingested policy.
//!
//! # Architecture
//!
//! ```text
//! query + policy text → Synthesizer → LLM → Parser → mentions
//!                                                      ↓
//!                          Decision ← Builder ← Matcher (clause snapshot)
//! ```
//!
//! The LLM provider is injected at construction. The clause snapshot is
//! read-only and shared between concurrent questions.
//!
//! # Example Usage
//!
//! ```no_run
//! use intelliclaim_engine::{DecisionEngine, DecisionPayload, EngineConfig, PolicyContext};
//! use intelliclaim_llm::MockProvider;
//! use intelliclaim_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("intelliclaim.db")?;
//! let context = PolicyContext::load(&store)?;
//!
//! let engine = DecisionEngine::new(MockProvider::new("**Claim:** APPROVED"), EngineConfig::default())?;
//! let decision = engine.decide("46M, knee surgery in Pune, 3-month policy", &context).await?;
//!
//! println!("{}", serde_json::to_string_pretty(&DecisionPayload::from(&decision))?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
mod config;
mod engine;
mod error;
mod matcher;
mod parser;
mod prompt;
mod synthesizer;

pub use builder::{
    build_decision, format_timestamp, ClausePayload, DecisionPayload, ExtractedInfoPayload,
    VerdictPayload,
};
pub use config::EngineConfig;
pub use engine::{BatchItem, BatchResult, BatchSummary, DecisionEngine, PolicyContext};
pub use error::{EngineError, SynthesisError};
pub use matcher::{ClauseMatcher, ClauseSnapshot, UNKNOWN_DOCUMENT};
pub use parser::{compose_justification, parse_response, ParsedResponse, DEFAULT_REASON};
pub use prompt::{abridge, Field, PromptBuilder};
pub use synthesizer::Synthesizer;
