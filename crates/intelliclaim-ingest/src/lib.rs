//! IntelliClaim Ingestion
//!
//! Turns an uploaded policy document into stored, addressable clauses.
//!
//! # Architecture
//!
//! ```text
//! bytes → TextExtractor → DocumentStore → ClauseSegmenter → ClauseStore
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use intelliclaim_domain::DocumentFormat;
//! use intelliclaim_ingest::{Ingestor, PlainTextExtractor};
//! use intelliclaim_store::SqliteStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new(":memory:")?;
//! let ingestor = Ingestor::new(PlainTextExtractor::new());
//!
//! let text = b"Section 1: Coverage\nHospitalisation is covered.\n";
//! let report = ingestor.ingest(&mut store, "policy.txt", text, DocumentFormat::Txt)?;
//! println!("Stored {} clauses", report.clauses_inserted);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod ingestor;
mod segmenter;
mod text;

pub use error::{ExtractionError, IngestError};
pub use ingestor::{IngestReport, Ingestor};
pub use segmenter::ClauseSegmenter;
pub use text::PlainTextExtractor;
