//! Batch command implementation.

use crate::cli::BatchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::provider::Provider;
use intelliclaim_domain::traits::DecisionStore;
use intelliclaim_engine::{DecisionEngine, PolicyContext};
use intelliclaim_store::SqliteStore;
use std::fs;
use std::io::{self, Read};
use std::time::Instant;
use tracing::warn;

/// Execute the batch command.
///
/// Individual question failures are reported in their slot; only a
/// missing policy or unreadable input fails the whole command.
pub async fn execute_batch(
    args: BatchArgs,
    store: &mut SqliteStore,
    engine: &DecisionEngine<Provider>,
    formatter: &Formatter,
) -> Result<()> {
    let text = if args.file.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&args.file)?
    };

    let questions = read_questions(&text);
    if questions.is_empty() {
        return Err(CliError::InvalidInput("No questions provided".to_string()));
    }

    let context = PolicyContext::load(&*store)?;

    let started = Instant::now();
    let result = engine.decide_batch(&questions, &context).await;
    let per_question_ms = started.elapsed().as_millis() as u64 / questions.len() as u64;

    if !args.no_save {
        for decision in result.items.iter().filter_map(|item| item.decision()) {
            if let Err(e) = store.save_decision(decision, per_question_ms) {
                warn!("Could not record decision {}: {}", decision.id(), e);
            }
        }
    }

    println!("{}", formatter.format_batch(&result)?);

    Ok(())
}

/// One question per non-blank line.
fn read_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
