//! Document ingestion pipeline

use crate::error::{ExtractionError, IngestError};
use crate::segmenter::ClauseSegmenter;
use intelliclaim_domain::traits::{ClauseStore, DocumentStore, TextExtractor};
use intelliclaim_domain::{DocumentFormat, DocumentId, ExtractionMetadata, NewDocument};
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument, warn};

/// Outcome of ingesting one document
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    /// Store-assigned id of the document
    pub document_id: DocumentId,
    /// Document name as uploaded
    pub document_name: String,
    /// Extraction metadata
    pub metadata: ExtractionMetadata,
    /// Clauses produced by segmentation
    pub clauses_found: usize,
    /// Clauses newly stored
    pub clauses_inserted: usize,
    /// Clauses skipped because their id already existed
    pub duplicates_skipped: usize,
    /// Whitespace-separated words in the extracted text
    pub word_count: usize,
}

/// Extracts, stores and segments policy documents
pub struct Ingestor<X> {
    extractor: X,
}

fn store_error(e: impl Display) -> IngestError {
    IngestError::Store(e.to_string())
}

impl<X: TextExtractor> Ingestor<X> {
    /// Create an ingestor around a text extractor
    pub fn new(extractor: X) -> Self {
        Self { extractor }
    }

    /// Ingest a document
    ///
    /// Clause numbering continues after the highest sequence already in
    /// the store so ids stay unique across documents. The document and its
    /// clauses are stored together or not at all.
    #[instrument(skip(self, store, bytes), fields(size = bytes.len()))]
    pub fn ingest<S>(
        &self,
        store: &mut S,
        name: &str,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<IngestReport, IngestError>
    where
        S: ClauseStore + DocumentStore,
        <S as ClauseStore>::Error: Display,
        <S as DocumentStore>::Error: Display,
    {
        let extracted = self.extractor.extract(bytes, format);
        if !extracted.has_text() {
            let reason = extracted
                .metadata
                .error
                .clone()
                .unwrap_or_else(|| "empty text".to_string());
            warn!("Extraction failed for '{}': {}", name, reason);
            return Err(ExtractionError {
                document: name.to_string(),
                reason,
            }
            .into());
        }

        let word_count = extracted.text.split_whitespace().count();
        let metadata = extracted.metadata.clone();

        let first_sequence = store.max_clause_sequence().map_err(store_error)? + 1;
        let clauses = ClauseSegmenter::new(unix_now()).segment_from(&extracted.text, first_sequence);
        let clauses_found = clauses.len();
        debug!("Segmented {} clauses starting at sequence {}", clauses_found, first_sequence);

        let (document_id, clauses_inserted) = store
            .insert_document_with_clauses(
                NewDocument {
                    name: name.to_string(),
                    format,
                    size: bytes.len() as u64,
                    extracted,
                },
                clauses,
            )
            .map_err(store_error)?;

        let report = IngestReport {
            document_id,
            document_name: name.to_string(),
            metadata,
            clauses_found,
            clauses_inserted,
            duplicates_skipped: clauses_found - clauses_inserted,
            word_count,
        };

        info!(
            "Ingested '{}' as document {}: {} clauses ({} new)",
            name, document_id, report.clauses_found, report.clauses_inserted
        );

        Ok(report)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::PlainTextExtractor;
    use intelliclaim_domain::traits::{ClauseStore, DocumentStore};
    use intelliclaim_store::SqliteStore;

    const GOLD: &[u8] = b"Section 1: Coverage\nHospitalisation is covered.\n\nExclusions:\nCosmetic surgery.\n";
    const SILVER: &[u8] = b"Section 1: Coverage\nDay-care procedures are covered.\n";

    #[test]
    fn test_ingest_stores_document_and_clauses() {
        let mut store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(PlainTextExtractor::new());

        let report = ingestor.ingest(&mut store, "gold.txt", GOLD, DocumentFormat::Txt).unwrap();

        assert_eq!(report.clauses_found, 2);
        assert_eq!(report.clauses_inserted, 2);
        assert_eq!(report.duplicates_skipped, 0);
        assert_eq!(report.word_count, 9);

        let clauses = store.list_clauses().unwrap();
        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(|c| c.document_id == Some(report.document_id)));

        let doc = store.latest_document().unwrap().unwrap();
        assert_eq!(doc.name, "gold.txt");
        assert_eq!(doc.size, GOLD.len() as u64);
    }

    #[test]
    fn test_second_document_continues_numbering() {
        let mut store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(PlainTextExtractor::new());

        ingestor.ingest(&mut store, "gold.txt", GOLD, DocumentFormat::Txt).unwrap();
        let report = ingestor.ingest(&mut store, "silver.txt", SILVER, DocumentFormat::Txt).unwrap();
        assert_eq!(report.clauses_inserted, 1);

        let ids: Vec<_> = store
            .list_clauses()
            .unwrap()
            .into_iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(ids, vec!["C001", "C002", "C003"]);
    }

    #[test]
    fn test_unsupported_format_is_an_extraction_error() {
        let mut store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(PlainTextExtractor::new());

        let err = ingestor
            .ingest(&mut store, "policy.pdf", b"%PDF-1.7", DocumentFormat::Pdf)
            .unwrap_err();

        match err {
            IngestError::Extraction(e) => {
                assert_eq!(e.document, "policy.pdf");
                assert!(e.reason.contains("not supported"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.latest_document().unwrap().is_none());
    }

    #[test]
    fn test_text_without_headings_stores_document_only() {
        let mut store = SqliteStore::in_memory().unwrap();
        let ingestor = Ingestor::new(PlainTextExtractor::new());

        let report = ingestor
            .ingest(&mut store, "memo.txt", b"Plain prose about the policy.", DocumentFormat::Txt)
            .unwrap();

        assert_eq!(report.clauses_found, 0);
        assert_eq!(store.clause_count().unwrap(), 0);
        assert!(store.latest_document().unwrap().is_some());
    }
}
