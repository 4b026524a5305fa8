//! Ingest command implementation.

use crate::cli::IngestArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use intelliclaim_domain::DocumentFormat;
use intelliclaim_ingest::{Ingestor, PlainTextExtractor};
use intelliclaim_store::SqliteStore;
use std::fs;
use std::path::Path;

/// Execute the ingest command.
pub async fn execute_ingest(args: IngestArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    let format = match args.document_format {
        Some(format) => format.into(),
        None => infer_format(&args.path)?,
    };

    let bytes = fs::read(&args.path)?;
    let name = args
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.path.display().to_string());

    let report = Ingestor::new(PlainTextExtractor::new()).ingest(store, &name, &bytes, format)?;

    println!("{}", formatter.format_ingest(&report)?);

    Ok(())
}

/// Document format implied by a file extension.
fn infer_format(path: &Path) -> Result<DocumentFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentFormat::from_extension)
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "Cannot infer document format of '{}'; pass --as <format>",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_format() {
        assert_eq!(infer_format(Path::new("policy.TXT")).unwrap(), DocumentFormat::Txt);
        assert_eq!(infer_format(Path::new("mail/renewal.eml")).unwrap(), DocumentFormat::Eml);
        assert!(matches!(infer_format(Path::new("policy")), Err(CliError::InvalidInput(_))));
        assert!(matches!(infer_format(Path::new("policy.xlsx")), Err(CliError::InvalidInput(_))));
    }
}
