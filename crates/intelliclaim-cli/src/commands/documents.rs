//! Documents command implementation.

use crate::cli::DocumentsArgs;
use crate::error::Result;
use crate::output::Formatter;
use intelliclaim_domain::traits::DocumentStore;
use intelliclaim_domain::DocumentId;
use intelliclaim_store::{SqliteStore, StoreError};

/// Execute the documents command.
pub async fn execute_documents(args: DocumentsArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let output = match args.id {
        Some(id) => {
            let document = store
                .get_document(DocumentId::new(id))?
                .ok_or_else(|| StoreError::NotFound(format!("document {}", id)))?;
            formatter.format_document(&document)?
        }
        None => formatter.format_documents(&store.list_documents()?)?,
    };

    println!("{}", output);

    Ok(())
}
