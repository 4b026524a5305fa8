//! Clauses command implementation.

use crate::cli::ClausesArgs;
use crate::error::Result;
use crate::output::Formatter;
use intelliclaim_domain::traits::ClauseStore;
use intelliclaim_store::SqliteStore;

/// Execute the clauses command.
pub async fn execute_clauses(args: ClausesArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let mut clauses = store.list_clauses()?;
    if let Some(limit) = args.limit {
        clauses.truncate(limit);
    }

    println!("{}", formatter.format_clauses(&clauses)?);

    Ok(())
}
