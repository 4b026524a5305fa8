//! IntelliClaim CLI - Decide insurance claims against an ingested policy.

use clap::Parser;
use intelliclaim_cli::commands;
use intelliclaim_cli::{Cli, Command, Config, Formatter, Provider};
use intelliclaim_engine::DecisionEngine;
use intelliclaim_store::SqliteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("intelliclaim=info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> intelliclaim_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config, writing defaults on first run
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    if !config_path.exists() {
        config.save_to(&config_path).ok();
    }

    // Command-line overrides
    if let Some(db) = cli.db {
        config.database = Some(db);
    }
    if let Some(provider) = cli.provider {
        config.llm.provider = provider.into();
    }

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let mut store = SqliteStore::new(config.database_path()?)?;

    match cli.command {
        Command::Ingest(args) => {
            commands::execute_ingest(args, &mut store, &formatter).await?;
        }
        Command::Clauses(args) => {
            commands::execute_clauses(args, &store, &formatter).await?;
        }
        Command::History(args) => {
            commands::execute_history(args, &store, &formatter).await?;
        }
        Command::Documents(args) => {
            commands::execute_documents(args, &store, &formatter).await?;
        }
        cmd => {
            // Commands that need a language model
            let provider = Provider::from_config(&config)?;
            let engine = DecisionEngine::new(provider, config.engine.clone())?;

            match cmd {
                Command::Ask(args) => {
                    commands::execute_ask(args, &mut store, &engine, &formatter).await?;
                }
                Command::Batch(args) => {
                    commands::execute_batch(args, &mut store, &engine, &formatter).await?;
                }
                _ => unreachable!(),
            }
        }
    }

    Ok(())
}
