//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use intelliclaim_domain::DocumentFormat;
use std::path::PathBuf;

/// IntelliClaim CLI - Decide insurance claims against an ingested policy.
#[derive(Debug, Parser)]
#[command(name = "intelliclaim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "INTELLICLAIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true, env = "INTELLICLAIM_DB")]
    pub db: Option<PathBuf>,

    /// LLM provider
    #[arg(long, value_enum, global = true, env = "INTELLICLAIM_PROVIDER")]
    pub provider: Option<ProviderArg>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids and verdicts only)
    Quiet,
}

/// LLM provider options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProviderArg {
    /// Canned offline responses
    Mock,
    /// Local Ollama server
    Ollama,
    /// Google Gemini
    Gemini,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest a policy document and segment it into clauses
    Ingest(IngestArgs),

    /// Decide a single claim question
    Ask(AskArgs),

    /// Decide every question in a file (one per line)
    Batch(BatchArgs),

    /// List stored clauses
    Clauses(ClausesArgs),

    /// Show recent decisions
    History(HistoryArgs),

    /// List ingested documents, or show one with its extracted text
    Documents(DocumentsArgs),
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Document to ingest
    pub path: PathBuf,

    /// Document format (inferred from the extension when omitted)
    #[arg(long = "as", value_enum)]
    pub document_format: Option<FormatArg>,
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Claim question, e.g. "46M, knee surgery in Pune, 3-month policy"
    pub query: String,

    /// Do not record the decision in history
    #[arg(long)]
    pub no_save: bool,
}

/// Arguments for the batch command.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// File with one question per line (`-` reads stdin)
    pub file: PathBuf,

    /// Do not record decisions in history
    #[arg(long)]
    pub no_save: bool,
}

/// Arguments for the clauses command.
#[derive(Debug, Parser)]
pub struct ClausesArgs {
    /// Maximum number of clauses to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the history command.
#[derive(Debug, Parser)]
pub struct HistoryArgs {
    /// Maximum number of decisions to show
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Arguments for the documents command.
#[derive(Debug, Parser)]
pub struct DocumentsArgs {
    /// Show this document's extracted text and metadata
    #[arg(long)]
    pub id: Option<i64>,
}

/// Document format argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FormatArg {
    /// PDF
    Pdf,
    /// Word document
    Docx,
    /// Outlook message
    Msg,
    /// E-mail
    Eml,
    /// Plain text
    Txt,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ProviderArg> for crate::config::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Mock => crate::config::ProviderKind::Mock,
            ProviderArg::Ollama => crate::config::ProviderKind::Ollama,
            ProviderArg::Gemini => crate::config::ProviderKind::Gemini,
        }
    }
}

impl From<FormatArg> for DocumentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pdf => DocumentFormat::Pdf,
            FormatArg::Docx => DocumentFormat::Docx,
            FormatArg::Msg => DocumentFormat::Msg,
            FormatArg::Eml => DocumentFormat::Eml,
            FormatArg::Txt => DocumentFormat::Txt,
        }
    }
}
