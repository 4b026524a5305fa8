//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Clause, ClauseId, Decision, Document, DocumentFormat, DocumentId, ExtractedText, NewDocument};
use std::collections::HashMap;

/// Trait for storing and listing policy clauses
///
/// Implemented by the infrastructure layer (intelliclaim-store)
pub trait ClauseStore {
    /// Error type for store operations
    type Error;

    /// Insert a clause
    ///
    /// Returns `Some(id)` when inserted, `None` when a clause with the
    /// same id already exists. Existing clauses are never overwritten.
    fn insert_clause(&mut self, clause: Clause) -> Result<Option<ClauseId>, Self::Error>;

    /// Every stored clause, in insertion order
    fn list_clauses(&self) -> Result<Vec<Clause>, Self::Error>;

    /// Highest clause sequence currently stored (0 when empty)
    fn max_clause_sequence(&self) -> Result<usize, Self::Error>;

    /// Display labels of every document referenced by a clause
    fn document_labels(&self) -> Result<HashMap<DocumentId, String>, Self::Error>;
}

/// Trait for storing ingested documents
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Insert a document and return its identifier
    fn insert_document(&mut self, document: NewDocument) -> Result<DocumentId, Self::Error>;

    /// Insert a document and its clauses as a single unit
    ///
    /// Every clause is attached to the new document. Clauses whose id is
    /// already stored are skipped as in [`ClauseStore::insert_clause`]. If
    /// any insert fails, neither the document nor its clauses are kept.
    /// Returns the document id and the number of clauses newly stored.
    fn insert_document_with_clauses(
        &mut self,
        document: NewDocument,
        clauses: Vec<Clause>,
    ) -> Result<(DocumentId, usize), Self::Error>;

    /// Get a document by ID
    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error>;

    /// Every stored document, newest first
    fn list_documents(&self) -> Result<Vec<Document>, Self::Error>;

    /// Most recently uploaded document
    fn latest_document(&self) -> Result<Option<Document>, Self::Error>;
}

/// Trait for persisting decision history
pub trait DecisionStore {
    /// Error type for store operations
    type Error;

    /// Persist a decision along with how long it took to produce
    fn save_decision(&mut self, decision: &Decision, processing_time_ms: u64) -> Result<(), Self::Error>;

    /// Most recent decisions, newest first
    fn recent_decisions(&self, limit: usize) -> Result<Vec<Decision>, Self::Error>;
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (intelliclaim-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Trait for turning document bytes into text plus metadata
///
/// Extraction never errors: failures come back as empty text with
/// failure metadata.
pub trait TextExtractor {
    /// Extract text from a byte stream of the declared format
    fn extract(&self, bytes: &[u8], format: DocumentFormat) -> ExtractedText;
}
