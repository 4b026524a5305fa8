//! Ask command implementation.

use crate::cli::AskArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::provider::Provider;
use intelliclaim_domain::traits::DecisionStore;
use intelliclaim_engine::{DecisionEngine, PolicyContext};
use intelliclaim_store::SqliteStore;
use std::time::Instant;

/// Execute the ask command.
///
/// Fails if no policy has been ingested or the LLM call fails.
pub async fn execute_ask(
    args: AskArgs,
    store: &mut SqliteStore,
    engine: &DecisionEngine<Provider>,
    formatter: &Formatter,
) -> Result<()> {
    if args.query.trim().is_empty() {
        return Err(CliError::InvalidInput("Query must not be empty".to_string()));
    }

    let context = PolicyContext::load(&*store)?;

    let started = Instant::now();
    let decision = engine.decide(&args.query, &context).await?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if !args.no_save {
        store.save_decision(&decision, elapsed_ms)?;
    }

    println!("{}", formatter.format_decision(&decision)?);

    Ok(())
}
