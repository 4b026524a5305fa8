//! IntelliClaim Storage Layer
//!
//! Implements the `ClauseStore`, `DocumentStore` and `DecisionStore`
//! traits on top of SQLite.
//!
//! # Architecture
//!
//! - `documents`: uploaded files with their extracted text and metadata
//! - `clauses`: segmented policy clauses, unique by `C###` id
//! - `decisions`: decision history, cited clauses stored as JSON
//!
//! # Examples
//!
//! ```no_run
//! use intelliclaim_store::SqliteStore;
//!
//! let store = SqliteStore::new("intelliclaim.db").unwrap();
//! // Store is now ready for clause operations
//! ```

#![warn(missing_docs)]

use intelliclaim_domain::traits::{ClauseStore, DecisionStore, DocumentStore};
use intelliclaim_domain::{
    Clause, ClauseId, Decision, DecisionId, Document, DocumentFormat, DocumentId, ExtractedInfo,
    ExtractionMetadata, MatchedClause, NewDocument, Verdict,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// SQLite-based implementation of the IntelliClaim stores
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance; the decision pipeline only ever reads a snapshot
/// taken up front.
pub struct SqliteStore {
    conn: Connection,
}

const DOCUMENT_COLUMNS: &str =
    "id, name, format, size, extracted_text, pages, confidence, language, processing_time, error, uploaded_at";

const DECISION_COLUMNS: &str =
    "id, query, verdict, confidence, amount, justification, relevant_clauses, extracted_info, generated_at";

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Number of stored clauses
    pub fn clause_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM clauses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Convert DecisionId to bytes for storage
    fn decision_id_to_bytes(id: DecisionId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to DecisionId
    fn bytes_to_decision_id(bytes: &[u8]) -> Result<DecisionId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for DecisionId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(DecisionId::from_value(u128::from_be_bytes(arr)))
    }

    fn row_to_clause(row: &Row<'_>) -> rusqlite::Result<Clause> {
        let keywords_json: String = row.get(7)?;
        let keywords: Vec<String> = serde_json::from_str(&keywords_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let page: Option<i64> = row.get(5)?;

        Ok(Clause {
            id: ClauseId::from_string(row.get::<_, String>(0)?),
            document_id: row.get::<_, Option<i64>>(1)?.map(DocumentId::new),
            title: row.get(2)?,
            body: row.get(3)?,
            category: row.get(4)?,
            page: page.map(|p| p as u32),
            keywords,
            created_at: row.get::<_, i64>(6)? as u64,
        })
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let format_str: String = row.get(2)?;
        let format = DocumentFormat::from_extension(&format_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(format!("Unknown document format: {}", format_str))),
            )
        })?;

        Ok(Document {
            id: DocumentId::new(row.get(0)?),
            name: row.get(1)?,
            format,
            size: row.get::<_, i64>(3)? as u64,
            extracted_text: row.get(4)?,
            metadata: ExtractionMetadata {
                pages: row.get::<_, i64>(5)? as u32,
                confidence: row.get(6)?,
                language: row.get(7)?,
                processing_time: row.get(8)?,
                error: row.get(9)?,
            },
            uploaded_at: row.get::<_, i64>(10)? as u64,
        })
    }

    fn row_to_decision(row: &Row<'_>) -> rusqlite::Result<Decision> {
        let conversion = |idx: usize, e: StoreError| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        };

        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_decision_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;

        let verdict_str: String = row.get(2)?;
        let verdict = Verdict::from_wire(&verdict_str)
            .ok_or_else(|| conversion(2, StoreError::InvalidData(format!("Unknown verdict: {}", verdict_str))))?;

        let clauses_json: String = row.get(6)?;
        let clauses = decode_matched_clauses(&clauses_json).map_err(|e| conversion(6, e))?;

        let info_json: String = row.get(7)?;
        let info = decode_extracted_info(&info_json).map_err(|e| conversion(7, e))?;

        Ok(Decision::new(
            id,
            row.get(1)?,
            verdict,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            clauses,
            info,
            row.get::<_, i64>(8)? as u64,
        ))
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn insert_document_row(conn: &Connection, document: &NewDocument) -> Result<DocumentId, StoreError> {
    let metadata = &document.extracted.metadata;
    conn.execute(
        "INSERT INTO documents (name, format, size, extracted_text, pages, confidence, language, processing_time, error, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            &document.name,
            document.format.as_str(),
            document.size as i64,
            &document.extracted.text,
            metadata.pages as i64,
            metadata.confidence,
            &metadata.language,
            &metadata.processing_time,
            &metadata.error,
            now_secs() as i64,
        ],
    )?;

    Ok(DocumentId::new(conn.last_insert_rowid()))
}

/// Returns false when a clause with the same id already exists
fn insert_clause_row(conn: &Connection, clause: &Clause) -> Result<bool, StoreError> {
    let keywords = serde_json::to_string(&clause.keywords)?;

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO clauses (clause_id, document_id, title, content, category, page_number, keywords, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            clause.id.as_str(),
            clause.document_id.map(|d| d.value()),
            &clause.title,
            &clause.body,
            &clause.category,
            clause.page.map(|p| p as i64),
            keywords,
            clause.created_at as i64,
        ],
    )?;

    if inserted == 0 {
        debug!("Clause {} already stored, insert skipped", clause.id);
    }
    Ok(inserted > 0)
}

fn encode_matched_clauses(clauses: &[MatchedClause]) -> Value {
    Value::Array(
        clauses
            .iter()
            .map(|c| {
                json!({
                    "clauseId": c.clause_id,
                    "text": c.text,
                    "page": c.page,
                    "document": c.document,
                    "relevanceScore": c.relevance_score,
                })
            })
            .collect(),
    )
}

fn decode_matched_clauses(json_str: &str) -> Result<Vec<MatchedClause>, StoreError> {
    let value: Value = serde_json::from_str(json_str)?;
    let items = value
        .as_array()
        .ok_or_else(|| StoreError::InvalidData("relevant_clauses is not an array".to_string()))?;

    items
        .iter()
        .map(|item| {
            let text_field = |key: &str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| StoreError::InvalidData(format!("relevant clause missing '{}'", key)))
            };
            Ok(MatchedClause {
                clause_id: text_field("clauseId")?,
                text: text_field("text")?,
                page: item.get("page").and_then(Value::as_u64).map(|p| p as u32),
                document: text_field("document")?,
                relevance_score: item.get("relevanceScore").and_then(Value::as_f64).unwrap_or(0.0),
            })
        })
        .collect()
}

fn encode_extracted_info(info: &ExtractedInfo) -> Value {
    json!({
        "age": info.age,
        "gender": info.gender,
        "procedure": info.procedure,
        "location": info.location,
        "policyAge": info.policy_age,
    })
}

fn decode_extracted_info(json_str: &str) -> Result<ExtractedInfo, StoreError> {
    let value: Value = serde_json::from_str(json_str)?;
    let defaults = ExtractedInfo::default();
    let field = |key: &str, fallback: String| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(fallback)
    };

    Ok(ExtractedInfo {
        age: field("age", defaults.age),
        gender: field("gender", defaults.gender),
        procedure: field("procedure", defaults.procedure),
        location: field("location", defaults.location),
        policy_age: field("policyAge", defaults.policy_age),
    })
}

impl ClauseStore for SqliteStore {
    type Error = StoreError;

    fn insert_clause(&mut self, clause: Clause) -> Result<Option<ClauseId>, Self::Error> {
        if insert_clause_row(&self.conn, &clause)? {
            Ok(Some(clause.id))
        } else {
            Ok(None)
        }
    }

    fn list_clauses(&self) -> Result<Vec<Clause>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT clause_id, document_id, title, content, category, page_number, created_at, keywords
             FROM clauses ORDER BY seq ASC",
        )?;

        let clauses = stmt
            .query_map([], Self::row_to_clause)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(clauses)
    }

    fn max_clause_sequence(&self) -> Result<usize, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT clause_id FROM clauses")?;
        let max = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter_map(|id| ClauseId::from_string(id).sequence())
            .max()
            .unwrap_or(0);
        Ok(max)
    }

    fn document_labels(&self) -> Result<HashMap<DocumentId, String>, Self::Error> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM documents")?;
        let labels = stmt
            .query_map([], |row| Ok((DocumentId::new(row.get(0)?), row.get::<_, String>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(labels)
    }
}

impl DocumentStore for SqliteStore {
    type Error = StoreError;

    fn insert_document(&mut self, document: NewDocument) -> Result<DocumentId, Self::Error> {
        insert_document_row(&self.conn, &document)
    }

    fn insert_document_with_clauses(
        &mut self,
        document: NewDocument,
        clauses: Vec<Clause>,
    ) -> Result<(DocumentId, usize), Self::Error> {
        let tx = self.conn.transaction()?;

        let document_id = insert_document_row(&tx, &document)?;
        let mut inserted = 0;
        for clause in clauses {
            if insert_clause_row(&tx, &clause.with_document(document_id))? {
                inserted += 1;
            }
        }

        tx.commit()?;
        Ok((document_id, inserted))
    }

    fn list_documents(&self) -> Result<Vec<Document>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM documents ORDER BY uploaded_at DESC, id DESC",
            DOCUMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let documents = stmt
            .query_map([], Self::row_to_document)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }

    fn get_document(&self, id: DocumentId) -> Result<Option<Document>, Self::Error> {
        let sql = format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS);
        let document = self
            .conn
            .query_row(&sql, params![id.value()], Self::row_to_document)
            .optional()?;
        Ok(document)
    }

    fn latest_document(&self) -> Result<Option<Document>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM documents ORDER BY uploaded_at DESC, id DESC LIMIT 1",
            DOCUMENT_COLUMNS
        );
        let document = self.conn.query_row(&sql, [], Self::row_to_document).optional()?;
        Ok(document)
    }
}

impl DecisionStore for SqliteStore {
    type Error = StoreError;

    fn save_decision(&mut self, decision: &Decision, processing_time_ms: u64) -> Result<(), Self::Error> {
        let clauses = serde_json::to_string(&encode_matched_clauses(decision.relevant_clauses()))?;
        let info = serde_json::to_string(&encode_extracted_info(decision.extracted_info()))?;

        self.conn.execute(
            "INSERT OR REPLACE INTO decisions (id, query, verdict, confidence, amount, justification, relevant_clauses, extracted_info, processing_time_ms, generated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                Self::decision_id_to_bytes(decision.id()),
                decision.query(),
                decision.verdict().as_str(),
                decision.confidence(),
                decision.amount(),
                decision.justification(),
                clauses,
                info,
                processing_time_ms as i64,
                decision.generated_at_ms() as i64,
            ],
        )?;
        Ok(())
    }

    fn recent_decisions(&self, limit: usize) -> Result<Vec<Decision>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM decisions ORDER BY generated_at DESC, id DESC LIMIT ?1",
            DECISION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let decisions = stmt
            .query_map(params![limit as i64], Self::row_to_decision)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_clause_json_round_trip() {
        let clauses = vec![
            MatchedClause {
                clause_id: "C001".to_string(),
                text: "Coverage excludes cosmetic surgery...".to_string(),
                page: Some(3),
                document: "policy.txt".to_string(),
                relevance_score: 0.5,
            },
            MatchedClause::unmatched("waiting period"),
        ];

        let encoded = serde_json::to_string(&encode_matched_clauses(&clauses)).unwrap();
        let decoded = decode_matched_clauses(&encoded).unwrap();
        assert_eq!(decoded, clauses);
    }

    #[test]
    fn test_decode_extracted_info_fills_missing_fields() {
        let info = decode_extracted_info(r#"{"age": "46"}"#).unwrap();
        assert_eq!(info.age, "46");
        assert_eq!(info.gender, "N/A");
    }

    #[test]
    fn test_failed_clause_insert_rolls_back_document() {
        use intelliclaim_domain::ExtractedText;

        let mut store = SqliteStore::in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TEMP TRIGGER reject_clause BEFORE INSERT ON clauses
                 WHEN NEW.title = 'Broken'
                 BEGIN SELECT RAISE(ABORT, 'clause rejected'); END;",
            )
            .unwrap();

        let document = NewDocument {
            name: "policy.txt".to_string(),
            format: DocumentFormat::Txt,
            size: 10,
            extracted: ExtractedText {
                text: "Section 1: Coverage".to_string(),
                metadata: ExtractionMetadata {
                    pages: 1,
                    confidence: 0.97,
                    language: "en".to_string(),
                    processing_time: "0.3s".to_string(),
                    error: None,
                },
            },
        };
        let clauses = vec![
            Clause::new(ClauseId::from_sequence(1), "Coverage", "Inpatient care", 0),
            Clause::new(ClauseId::from_sequence(2), "Broken", "Never stored", 0),
        ];

        let result = store.insert_document_with_clauses(document, clauses);

        assert!(matches!(result, Err(StoreError::Database(_))));
        assert!(store.latest_document().unwrap().is_none());
        assert_eq!(store.clause_count().unwrap(), 0);
    }

    #[test]
    fn test_decode_matched_clauses_rejects_non_array() {
        assert!(decode_matched_clauses(r#"{"a": 1}"#).is_err());
    }
}
