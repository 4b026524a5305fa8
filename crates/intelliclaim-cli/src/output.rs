//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use intelliclaim_domain::{Clause, Decision, Document, Verdict};
use intelliclaim_engine::{format_timestamp, BatchItem, BatchResult, DecisionPayload};
use intelliclaim_ingest::IngestReport;
use serde_json::json;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
fn shorten(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &flat[..idx]),
        None => flat,
    }
}

fn document_json(doc: &Document) -> serde_json::Value {
    let status = if doc.metadata.error.is_some() { "failed" } else { "processed" };
    json!({
        "id": doc.id.value(),
        "name": doc.name,
        "type": doc.format.as_str(),
        "size": doc.size,
        "uploadedAt": format_timestamp(doc.uploaded_at * 1000),
        "status": status,
        "wordCount": doc.word_count(),
        "metadata": {
            "pages": doc.metadata.pages,
            "confidence": doc.metadata.confidence,
            "language": doc.metadata.language,
            "processingTime": doc.metadata.processing_time,
            "error": doc.metadata.error,
        }
    })
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a single decision.
    pub fn format_decision(&self, decision: &Decision) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&DecisionPayload::from(decision))?),
            OutputFormat::Table => Ok(self.format_decision_table(decision)),
            OutputFormat::Quiet => Ok(format!("{} {}", decision.id(), decision.verdict())),
        }
    }

    fn format_decision_table(&self, decision: &Decision) -> String {
        let info = decision.extracted_info();
        let mut out = String::new();

        out.push_str(&format!("Query: {}\n", decision.query()));
        out.push_str(&format!(
            "Verdict: {}   confidence {:.2}   amount {:.2}\n\n",
            self.verdict(decision.verdict()),
            decision.confidence(),
            decision.amount()
        ));
        out.push_str(decision.justification());
        out.push_str("\n\n");

        let mut details = Builder::default();
        details.push_record(["Age", "Gender", "Procedure", "Location", "Policy Age"]);
        details.push_record([
            info.age.as_str(),
            info.gender.as_str(),
            info.procedure.as_str(),
            info.location.as_str(),
            info.policy_age.as_str(),
        ]);
        out.push_str(&self.render(details));

        if decision.relevant_clauses().is_empty() {
            out.push('\n');
            out.push_str(&self.colorize("No clauses cited.", "yellow"));
            return out;
        }

        let mut clauses = Builder::default();
        clauses.push_record(["Clause", "Document", "Page", "Score", "Text"]);
        for clause in decision.relevant_clauses() {
            let page = clause.page.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
            let score = format!("{:.2}", clause.relevance_score);
            clauses.push_record([
                clause.clause_id.as_str(),
                clause.document.as_str(),
                page.as_str(),
                score.as_str(),
                shorten(&clause.text, 60).as_str(),
            ]);
        }
        out.push('\n');
        out.push_str(&self.render(clauses));
        out
    }

    /// Format the results of a batch run.
    pub fn format_batch(&self, result: &BatchResult) -> Result<String> {
        let summary = &result.summary;
        match self.format {
            OutputFormat::Json => {
                let answers: Vec<serde_json::Value> = result
                    .items
                    .iter()
                    .map(|item| match item {
                        BatchItem::Decided(decision) => serde_json::to_value(DecisionPayload::from(decision)),
                        BatchItem::Failed { query, error } => Ok(json!({
                            "query": query,
                            "error": error,
                        })),
                    })
                    .collect::<std::result::Result<_, _>>()?;

                Ok(serde_json::to_string_pretty(&json!({
                    "answers": answers,
                    "summary": {
                        "total": summary.total,
                        "approved": summary.approved,
                        "rejected": summary.rejected,
                        "unknown": summary.unknown,
                        "failed": summary.failed,
                        "totalAmount": summary.total_amount,
                    }
                }))?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["#", "Question", "Verdict", "Confidence", "Amount"]);
                for (idx, item) in result.items.iter().enumerate() {
                    let row = match item {
                        BatchItem::Decided(d) => [
                            (idx + 1).to_string(),
                            shorten(d.query(), 50),
                            self.verdict(d.verdict()),
                            format!("{:.2}", d.confidence()),
                            format!("{:.2}", d.amount()),
                        ],
                        BatchItem::Failed { query, error } => [
                            (idx + 1).to_string(),
                            shorten(query, 50),
                            self.colorize("failed", "red"),
                            "-".to_string(),
                            shorten(error, 40),
                        ],
                    };
                    builder.push_record(row);
                }

                let mut out = self.render(builder);
                out.push('\n');
                out.push_str(&self.info(&format!(
                    "{} questions: {} approved, {} rejected, {} unknown, {} failed (total amount {:.2})",
                    summary.total,
                    summary.approved,
                    summary.rejected,
                    summary.unknown,
                    summary.failed,
                    summary.total_amount
                )));
                Ok(out)
            }
            OutputFormat::Quiet => Ok(result
                .items
                .iter()
                .map(|item| match item {
                    BatchItem::Decided(d) => format!("{} {}", d.id(), d.verdict()),
                    BatchItem::Failed { .. } => "- failed".to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format stored clauses.
    pub fn format_clauses(&self, clauses: &[Clause]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<serde_json::Value> = clauses
                    .iter()
                    .map(|c| {
                        json!({
                            "clauseId": c.id.as_str(),
                            "documentId": c.document_id.map(|d| d.value()),
                            "title": c.title,
                            "content": c.body,
                            "category": c.category,
                            "page": c.page,
                            "keywords": c.keywords,
                            "createdAt": c.created_at,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&items)?)
            }
            OutputFormat::Table => {
                if clauses.is_empty() {
                    return Ok(self.colorize("No clauses found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Title", "Document", "Page", "Content"]);
                for clause in clauses {
                    builder.push_record([
                        clause.id.to_string(),
                        shorten(&clause.title, 30),
                        clause.document_id.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                        clause.page.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                        shorten(&clause.body, 60),
                    ]);
                }
                Ok(self.render(builder))
            }
            OutputFormat::Quiet => Ok(clauses
                .iter()
                .map(|c| c.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format decision history.
    pub fn format_history(&self, decisions: &[Decision]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<serde_json::Value> = decisions
                    .iter()
                    .map(|d| -> std::result::Result<serde_json::Value, serde_json::Error> {
                        Ok(json!({
                            "id": d.id().to_string(),
                            "query": d.query(),
                            "result": serde_json::to_value(DecisionPayload::from(d))?,
                        }))
                    })
                    .collect::<std::result::Result<_, _>>()?;
                Ok(serde_json::to_string_pretty(&items)?)
            }
            OutputFormat::Table => {
                if decisions.is_empty() {
                    return Ok(self.colorize("No decisions recorded.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Time", "Verdict", "Confidence", "Amount", "Query"]);
                for d in decisions {
                    let id = d.id().to_string();
                    builder.push_record([
                        id[..8].to_string(),
                        format_timestamp(d.generated_at_ms()),
                        self.verdict(d.verdict()),
                        format!("{:.2}", d.confidence()),
                        format!("{:.2}", d.amount()),
                        shorten(d.query(), 50),
                    ]);
                }
                Ok(self.render(builder))
            }
            OutputFormat::Quiet => Ok(decisions
                .iter()
                .map(|d| format!("{} {}", d.id(), d.verdict()))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format the outcome of an ingestion.
    pub fn format_ingest(&self, report: &IngestReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "documentId": report.document_id.value(),
                "document": report.document_name,
                "clausesFound": report.clauses_found,
                "clausesInserted": report.clauses_inserted,
                "duplicatesSkipped": report.duplicates_skipped,
                "wordCount": report.word_count,
                "metadata": {
                    "pages": report.metadata.pages,
                    "confidence": report.metadata.confidence,
                    "language": report.metadata.language,
                    "processingTime": report.metadata.processing_time,
                }
            }))?),
            OutputFormat::Table => {
                let mut out = self.success(&format!(
                    "Ingested '{}' as document {}",
                    report.document_name, report.document_id
                ));
                out.push('\n');
                out.push_str(&format!(
                    "  {} pages, {} words, extraction confidence {:.2}, language {}\n",
                    report.metadata.pages, report.word_count, report.metadata.confidence, report.metadata.language
                ));
                if report.clauses_found == 0 {
                    out.push_str(&self.warning("No clause headings found; document stored without clauses"));
                } else {
                    out.push_str(&format!(
                        "  {} clauses found, {} stored, {} duplicates skipped",
                        report.clauses_found, report.clauses_inserted, report.duplicates_skipped
                    ));
                }
                Ok(out)
            }
            OutputFormat::Quiet => Ok(report.document_id.to_string()),
        }
    }

    /// Format the list of stored documents.
    pub fn format_documents(&self, documents: &[Document]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<serde_json::Value> = documents.iter().map(document_json).collect();
                Ok(serde_json::to_string_pretty(&items)?)
            }
            OutputFormat::Table => {
                if documents.is_empty() {
                    return Ok(self.colorize("No documents ingested.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Type", "Size", "Pages", "Words", "Uploaded"]);
                for doc in documents {
                    builder.push_record([
                        doc.id.to_string(),
                        shorten(&doc.name, 40),
                        doc.format.to_string(),
                        doc.size.to_string(),
                        doc.metadata.pages.to_string(),
                        doc.word_count().to_string(),
                        format_timestamp(doc.uploaded_at * 1000),
                    ]);
                }
                Ok(self.render(builder))
            }
            OutputFormat::Quiet => Ok(documents
                .iter()
                .map(|d| format!("{} {}", d.id, d.name))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format one document with its extracted text.
    pub fn format_document(&self, document: &Document) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = document_json(document);
                value["extractedText"] = json!(document.extracted_text);
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let meta = &document.metadata;
                let mut details = Builder::default();
                details.push_record(["Words", "Pages", "Confidence", "Language", "Processing Time"]);
                details.push_record([
                    document.word_count().to_string(),
                    meta.pages.to_string(),
                    format!("{:.2}", meta.confidence),
                    meta.language.clone(),
                    meta.processing_time.clone(),
                ]);

                let mut out = format!(
                    "Document {}: {} ({}, {} bytes)\n",
                    document.id, document.name, document.format, document.size
                );
                out.push_str(&self.render(details));
                if let Some(error) = &meta.error {
                    out.push('\n');
                    out.push_str(&self.warning(&format!("Extraction error: {}", error)));
                }
                out.push_str("\n\n");
                out.push_str(&document.extracted_text);
                Ok(out)
            }
            OutputFormat::Quiet => Ok(document.extracted_text.clone()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn verdict(&self, verdict: Verdict) -> String {
        let color = match verdict {
            Verdict::Approved => "green",
            Verdict::Rejected => "red",
            Verdict::Unknown => "yellow",
        };
        self.colorize(verdict.as_str(), color)
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelliclaim_domain::{ClauseId, DecisionId, ExtractedInfo, MatchedClause};
    use intelliclaim_engine::BatchSummary;

    fn decision(verdict: Verdict) -> Decision {
        Decision::new(
            DecisionId::new(),
            "46M, knee surgery in Pune".to_string(),
            verdict,
            0.95,
            1500.0,
            "Decision: The claim is **Approved**.".to_string(),
            vec![MatchedClause {
                clause_id: "C002".to_string(),
                text: "Planned knee surgery is covered after 24 months.".to_string(),
                page: Some(2),
                document: "gold-plan.txt".to_string(),
                relevance_score: 0.86,
            }],
            ExtractedInfo {
                age: "46".to_string(),
                ..ExtractedInfo::default()
            },
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_decision_json_is_payload() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_decision(&decision(Verdict::Approved)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["decision"]["verdict"], "approved");
        assert_eq!(value["extractedInfo"]["age"], "46");
        assert_eq!(value["relevantClauses"][0]["clauseId"], "C002");
    }

    #[test]
    fn test_decision_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_decision(&decision(Verdict::Rejected)).unwrap();

        assert!(output.contains("rejected"));
        assert!(output.contains("Policy Age"));
        assert!(output.contains("gold-plan.txt"));
        assert!(output.contains("0.86"));
    }

    #[test]
    fn test_decision_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let d = decision(Verdict::Approved);
        assert_eq!(formatter.format_decision(&d).unwrap(), format!("{} approved", d.id()));
    }

    #[test]
    fn test_batch_json_keeps_failed_slots() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let result = BatchResult {
            items: vec![
                BatchItem::Decided(decision(Verdict::Approved)),
                BatchItem::Failed {
                    query: "dental implant".to_string(),
                    error: "LLM error: Mock error".to_string(),
                },
            ],
            summary: BatchSummary {
                total: 2,
                approved: 1,
                failed: 1,
                total_amount: 1500.0,
                ..BatchSummary::default()
            },
        };

        let value: serde_json::Value = serde_json::from_str(&formatter.format_batch(&result).unwrap()).unwrap();
        assert_eq!(value["answers"].as_array().unwrap().len(), 2);
        assert_eq!(value["answers"][1]["query"], "dental implant");
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["summary"]["totalAmount"], 1500.0);
    }

    #[test]
    fn test_empty_clauses_and_history() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_clauses(&[]).unwrap().contains("No clauses found"));
        assert!(formatter.format_history(&[]).unwrap().contains("No decisions recorded"));
    }

    #[test]
    fn test_clauses_quiet_lists_ids() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let clauses = vec![
            Clause::new(ClauseId::from_sequence(1), "Coverage", "Inpatient care", 0),
            Clause::new(ClauseId::from_sequence(2), "Exclusions", "Cosmetic surgery", 0),
        ];
        assert_eq!(formatter.format_clauses(&clauses).unwrap(), "C001\nC002");
    }

    fn document() -> Document {
        Document {
            id: intelliclaim_domain::DocumentId::new(7),
            name: "gold-plan.txt".to_string(),
            format: intelliclaim_domain::DocumentFormat::Txt,
            size: 58,
            extracted_text: "Section 1: Coverage\nInpatient care is covered.".to_string(),
            metadata: intelliclaim_domain::ExtractionMetadata {
                pages: 1,
                confidence: 0.97,
                language: "en".to_string(),
                processing_time: "0.3s".to_string(),
                error: None,
            },
            uploaded_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_document_json_includes_text_and_metadata() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_document(&document()).unwrap()).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "txt");
        assert_eq!(value["status"], "processed");
        assert_eq!(value["wordCount"], 7);
        assert_eq!(value["uploadedAt"], "2023-11-14T22:13:20.000Z");
        assert_eq!(value["metadata"]["processingTime"], "0.3s");
        assert_eq!(value["extractedText"], "Section 1: Coverage\nInpatient care is covered.");
    }

    #[test]
    fn test_document_list_omits_text() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_documents(&[document()]).unwrap()).unwrap();

        assert_eq!(value[0]["name"], "gold-plan.txt");
        assert!(value[0].get("extractedText").is_none());
    }

    #[test]
    fn test_document_table_shows_metadata_and_text() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_document(&document()).unwrap();

        assert!(output.starts_with("Document 7: gold-plan.txt (txt, 58 bytes)"));
        assert!(output.contains("Processing Time"));
        assert!(output.contains("0.3s"));
        assert!(output.ends_with("Inpatient care is covered."));
        assert!(formatter.format_documents(&[]).unwrap().contains("No documents ingested"));
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("a  b\nc", 10), "a b c");
        assert_eq!(shorten("abcdef", 3), "abc…");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("boom"), "✗ boom");
    }
}
