//! Response Parser: pull labeled fields out of the LLM answer
//!
//! Each field is found independently. A label is `**Label:**` (or
//! `**Label**:`), matched case-insensitively, and its value runs until
//! the next known label or the end of the text. The first occurrence of
//! a label wins and an empty value counts as absent. Parsing never
//! fails: absent or malformed fields fall back to the defaults exposed
//! by the accessors on [`ParsedResponse`].

use crate::prompt::Field;
use intelliclaim_domain::{ConfidenceBucket, ExtractedInfo, Verdict, NOT_AVAILABLE};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Reason used when the answer carries none
pub const DEFAULT_REASON: &str = "No specific reason provided.";

static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let labels = Field::ALL
        .iter()
        .map(|f| regex::escape(f.label()).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\*\*\s*({})\s*(?::\s*\*\*|\*\*\s*:)", labels))
        .expect("label pattern is valid")
});

static VERDICT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)approved|rejected").expect("verdict pattern is valid"));

static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("amount pattern is valid"));

/// Structured fields parsed out of one LLM answer
///
/// `None` means the field was absent or unusable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    /// Verdict named in the `Claim` field
    pub verdict: Option<Verdict>,
    /// `Reason` text
    pub reason: Option<String>,
    /// Lines of the `Relevant Clauses` block
    pub clause_mentions: Option<Vec<String>>,
    /// `Confidence` bucket
    pub confidence: Option<ConfidenceBucket>,
    /// `Estimated Amount`
    pub amount: Option<f64>,
    /// `Age`
    pub age: Option<String>,
    /// `Gender`
    pub gender: Option<String>,
    /// `Procedure`
    pub procedure: Option<String>,
    /// `Location`
    pub location: Option<String>,
    /// `Policy Age`
    pub policy_age: Option<String>,
}

impl ParsedResponse {
    /// Verdict, defaulting to [`Verdict::Unknown`]
    pub fn verdict(&self) -> Verdict {
        self.verdict.unwrap_or_default()
    }

    /// Reason, defaulting to [`DEFAULT_REASON`]
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(DEFAULT_REASON)
    }

    /// Clause mentions in answer order, defaulting to none
    pub fn mentions(&self) -> &[String] {
        self.clause_mentions.as_deref().unwrap_or(&[])
    }

    /// Confidence bucket, defaulting to Medium
    pub fn confidence_bucket(&self) -> ConfidenceBucket {
        self.confidence.unwrap_or_default()
    }

    /// Numeric confidence (0.4 / 0.6 / 0.95), defaulting to 0.6
    pub fn confidence(&self) -> f64 {
        self.confidence_bucket().score()
    }

    /// Estimated amount, defaulting to 0.0
    pub fn amount(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    /// Entity fields, each defaulting to `"N/A"`
    pub fn extracted_info(&self) -> ExtractedInfo {
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
        ExtractedInfo {
            age: or_na(&self.age),
            gender: or_na(&self.gender),
            procedure: or_na(&self.procedure),
            location: or_na(&self.location),
            policy_age: or_na(&self.policy_age),
        }
    }
}

/// First non-empty trimmed value of each label
fn labeled_values(text: &str) -> HashMap<Field, &str> {
    let labels: Vec<_> = LABEL_PATTERN.captures_iter(text).collect();
    let mut values = HashMap::new();

    for (idx, caps) in labels.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(field) = Field::from_label(&name.as_str().split_whitespace().collect::<Vec<_>>().join(" ")) else {
            continue;
        };
        if values.contains_key(&field) {
            continue;
        }

        let end = labels
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let value = text[whole.end()..end].trim();
        if !value.is_empty() {
            values.insert(field, value);
        }
    }

    values
}

fn parse_verdict(value: &str) -> Option<Verdict> {
    VERDICT_PATTERN
        .find(value)
        .and_then(|m| Verdict::from_wire(&m.as_str().to_lowercase()))
}

fn parse_confidence(value: &str) -> Option<ConfidenceBucket> {
    let word = value.split_whitespace().next()?;
    ConfidenceBucket::from_label(word.trim_matches(|c: char| !c.is_alphanumeric()))
}

fn parse_amount(value: &str) -> Option<f64> {
    let digits = AMOUNT_PATTERN.find(value)?.as_str().replace(',', "");
    digits.parse::<f64>().ok().filter(|a| a.is_finite()).map(|a| a.max(0.0))
}

fn parse_mentions(value: &str) -> Vec<String> {
    value
        .lines()
        .map(|line| {
            // Bold markers can sit anywhere in the mention, not only at its ends
            let line = line.replace("**", "").replace("__", "");
            line.trim()
                .trim_start_matches(|c: char| matches!(c, '*' | '•' | '-' | '–' | '+') || c.is_whitespace())
                .trim_matches(|c: char| matches!(c, '*' | '_') || c.is_whitespace())
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

fn entity(values: &HashMap<Field, &str>, field: Field) -> Option<String> {
    values.get(&field).map(|v| v.to_string())
}

/// Parse an LLM answer into structured fields
pub fn parse_response(text: &str) -> ParsedResponse {
    let values = labeled_values(text);

    let parsed = ParsedResponse {
        verdict: values.get(&Field::Claim).and_then(|v| parse_verdict(v)),
        reason: entity(&values, Field::Reason),
        clause_mentions: values.get(&Field::RelevantClauses).map(|v| parse_mentions(v)),
        confidence: values.get(&Field::Confidence).and_then(|v| parse_confidence(v)),
        amount: values.get(&Field::EstimatedAmount).and_then(|v| parse_amount(v)),
        age: entity(&values, Field::Age),
        gender: entity(&values, Field::Gender),
        procedure: entity(&values, Field::Procedure),
        location: entity(&values, Field::Location),
        policy_age: entity(&values, Field::PolicyAge),
    };

    log_defaults(&parsed);
    parsed
}

fn log_defaults(parsed: &ParsedResponse) {
    let defaulted = [
        (Field::Claim, parsed.verdict.is_none()),
        (Field::Reason, parsed.reason.is_none()),
        (Field::RelevantClauses, parsed.clause_mentions.is_none()),
        (Field::Confidence, parsed.confidence.is_none()),
        (Field::EstimatedAmount, parsed.amount.is_none()),
        (Field::Age, parsed.age.is_none()),
        (Field::Gender, parsed.gender.is_none()),
        (Field::Procedure, parsed.procedure.is_none()),
        (Field::Location, parsed.location.is_none()),
        (Field::PolicyAge, parsed.policy_age.is_none()),
    ];
    for (field, missing) in defaulted {
        if missing {
            debug!("Field '{}' absent or malformed, using default", field.label());
        }
    }
}

/// Whole currency units with thousands separators (`1234567.9` → `1,234,567`)
fn group_thousands(amount: f64) -> String {
    let whole = amount.max(0.0).trunc() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Narrative justification for a parsed answer
pub fn compose_justification(parsed: &ParsedResponse, currency_symbol: &str) -> String {
    let verdict = parsed.verdict();
    let clause_analysis = if parsed.mentions().is_empty() {
        "No relevant clauses were found in the policy document."
    } else {
        "Relevant clauses were identified and analyzed."
    };

    format!(
        "Decision: The claim is **{}**.\n\n\
         Reasoning: {}\n\n\
         Clause Analysis: {}\n\n\
         Conclusion: Based on the above reasoning and policy wording, the claim has been {} with a confidence level of {}.\n\n\
         Estimated Payout: {}{} (if applicable)",
        verdict.title(),
        parsed.reason(),
        clause_analysis,
        verdict.as_str(),
        parsed.confidence_bucket().label(),
        currency_symbol,
        group_thousands(parsed.amount()),
    )
}
