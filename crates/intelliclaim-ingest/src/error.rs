//! Error types for ingestion

use thiserror::Error;

/// No usable text could be extracted from a document
#[derive(Error, Debug, Clone, PartialEq)]
#[error("No usable text extracted from '{document}': {reason}")]
pub struct ExtractionError {
    /// Document name
    pub document: String,
    /// Reason reported by the extractor
    pub reason: String,
}

/// Errors that can occur while ingesting a document
#[derive(Error, Debug)]
pub enum IngestError {
    /// Text extraction produced nothing usable
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Document or clause store error
    #[error("Store error: {0}")]
    Store(String),
}
