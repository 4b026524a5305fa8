//! History command implementation.

use crate::cli::HistoryArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use intelliclaim_domain::traits::DecisionStore;
use intelliclaim_store::SqliteStore;

/// Execute the history command.
pub async fn execute_history(args: HistoryArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    if args.limit == 0 {
        return Err(CliError::InvalidInput("Limit must be greater than 0".to_string()));
    }

    let decisions = store.recent_decisions(args.limit)?;

    println!("{}", formatter.format_history(&decisions)?);

    Ok(())
}
