//! Command implementations.

pub mod ask;
pub mod batch;
pub mod clauses;
pub mod documents;
pub mod history;
pub mod ingest;

pub use self::ask::execute_ask;
pub use self::batch::execute_batch;
pub use self::clauses::execute_clauses;
pub use self::documents::execute_documents;
pub use self::history::execute_history;
pub use self::ingest::execute_ingest;
