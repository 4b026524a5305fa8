//! Decision prompt and the labeled-field contract shared with the parser

use regex::{Regex, RegexBuilder};

/// A labeled field the LLM is asked to fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Approve/reject verdict
    Claim,
    /// Short justification
    Reason,
    /// Clause references, one per line
    RelevantClauses,
    /// Low / Medium / High
    Confidence,
    /// Payout estimate
    EstimatedAmount,
    /// Claimant age
    Age,
    /// Claimant gender
    Gender,
    /// Medical procedure
    Procedure,
    /// Treatment location
    Location,
    /// How long the policy has been held
    PolicyAge,
}

impl Field {
    /// Every field, in prompt order
    pub const ALL: [Field; 10] = [
        Field::Claim,
        Field::Reason,
        Field::RelevantClauses,
        Field::Confidence,
        Field::EstimatedAmount,
        Field::Age,
        Field::Gender,
        Field::Procedure,
        Field::Location,
        Field::PolicyAge,
    ];

    /// Label text as it appears between the `**` markers
    pub fn label(self) -> &'static str {
        match self {
            Field::Claim => "Claim",
            Field::Reason => "Reason",
            Field::RelevantClauses => "Relevant Clauses",
            Field::Confidence => "Confidence",
            Field::EstimatedAmount => "Estimated Amount",
            Field::Age => "Age",
            Field::Gender => "Gender",
            Field::Procedure => "Procedure",
            Field::Location => "Location",
            Field::PolicyAge => "Policy Age",
        }
    }

    /// Value hint shown to the model
    fn hint(self) -> &'static str {
        match self {
            Field::Claim => "APPROVED or REJECTED",
            Field::Reason => "Brief justification",
            Field::RelevantClauses => "List relevant clauses",
            Field::Confidence => "Low / Medium / High",
            Field::EstimatedAmount => "$XXXX",
            _ => "",
        }
    }

    /// Look up a field by label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.label().eq_ignore_ascii_case(label))
    }
}

/// Builds the decision prompt for one question
pub struct PromptBuilder {
    policy_text: String,
    query: String,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(policy_text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            policy_text: policy_text.into(),
            query: query.into(),
        }
    }

    /// Build the complete decision prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("Given this insurance policy:\n<POLICY_TEXT>\n");
        prompt.push_str(&self.policy_text);
        prompt.push_str("\n</POLICY_TEXT>\n\n");

        prompt.push_str("And this user query:\n");
        prompt.push_str(&self.query);
        prompt.push_str("\n\n");

        prompt.push_str("Please determine whether the claim is **APPROVED** or **REJECTED**. Also provide:\n\n");
        for field in Field::ALL {
            let line = format!("**{}:** {}", field.label(), field.hint());
            prompt.push_str(line.trim_end());
            prompt.push('\n');
        }

        prompt
    }
}

fn keyword_pattern(keywords: &[&str]) -> Option<Regex> {
    if keywords.is_empty() {
        return None;
    }
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&alternation).case_insensitive(true).build().ok()
}

/// Reduce policy text to its keyword sections
///
/// For each keyword in order, takes the span from its first
/// case-insensitive occurrence up to the next occurrence of any keyword
/// (or the end of the text). Spans are joined in keyword order. When no
/// keyword occurs at all the text is returned unchanged.
pub fn abridge(text: &str, keywords: &[String]) -> String {
    let keywords: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    let Some(any_keyword) = keyword_pattern(&keywords) else {
        return text.to_string();
    };

    let mut spans = Vec::new();
    for keyword in &keywords {
        let Some(pattern) = keyword_pattern(&[*keyword]) else {
            continue;
        };
        let Some(start) = pattern.find(text) else {
            continue;
        };
        let end = any_keyword
            .find_at(text, start.end())
            .map_or(text.len(), |next| next.start());
        spans.push(text[start.start()..end].trim());
    }

    if spans.is_empty() {
        return text.to_string();
    }
    spans.join("\n\n")
}

/// Truncate to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
