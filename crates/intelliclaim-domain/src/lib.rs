//! IntelliClaim Domain Layer
//!
//! Core vocabulary shared by every other crate: policy clauses, ingested
//! documents, claim decisions, and the trait seams through which the
//! pipeline talks to its collaborators (LLM, stores, text extraction).
//!
//! ## Key Concepts
//!
//! - **Clause**: a titled, bounded span of policy text addressable by a `C###` id
//! - **Mention**: a free-text clause reference in an LLM answer (never stored)
//! - **MatchedClause**: a mention grounded against the clause store
//! - **Decision**: the immutable outcome of one claim question
//!
//! ## Architecture
//!
//! This crate holds no infrastructure. Storage, LLM transport and text
//! extraction are implemented in other crates against the traits in
//! [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clause;
pub mod confidence;
pub mod decision;
pub mod document;
pub mod traits;

// Re-exports for convenience
pub use clause::{Clause, ClauseId};
pub use confidence::ConfidenceBucket;
pub use decision::{Decision, DecisionId, ExtractedInfo, MatchedClause, Verdict, NOT_AVAILABLE};
pub use document::{Document, DocumentFormat, DocumentId, ExtractedText, ExtractionMetadata, NewDocument};
