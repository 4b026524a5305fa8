//! Claim decisions and their grounded clause citations

use std::fmt;

/// Sentinel for entity fields the model did not supply
pub const NOT_AVAILABLE: &str = "N/A";

/// Unique identifier for a decision based on UUIDv7
///
/// UUIDv7 keeps decision history chronologically sortable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecisionId(u128);

impl DecisionId {
    /// Generate a new UUIDv7-based DecisionId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a DecisionId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a DecisionId from its hyphenated string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid decision id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Outcome of a claim decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Verdict {
    /// Claim is payable under the policy
    Approved,
    /// Claim is not payable under the policy
    Rejected,
    /// The model gave no recognizable verdict
    #[default]
    Unknown,
}

impl Verdict {
    /// Lowercase wire form (`approved`, `rejected`, `unknown`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approved => "approved",
            Verdict::Rejected => "rejected",
            Verdict::Unknown => "unknown",
        }
    }

    /// Capitalized form used in narratives
    pub fn title(&self) -> &'static str {
        match self {
            Verdict::Approved => "Approved",
            Verdict::Rejected => "Rejected",
            Verdict::Unknown => "Unknown",
        }
    }

    /// Parse the lowercase wire form
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Verdict::Approved),
            "rejected" => Some(Verdict::Rejected),
            "unknown" => Some(Verdict::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claimant details the model pulled out of the question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedInfo {
    /// Claimant age
    pub age: String,
    /// Claimant gender
    pub gender: String,
    /// Medical procedure
    pub procedure: String,
    /// Treatment location
    pub location: String,
    /// How long the policy has been held
    pub policy_age: String,
}

impl Default for ExtractedInfo {
    fn default() -> Self {
        Self {
            age: NOT_AVAILABLE.to_string(),
            gender: NOT_AVAILABLE.to_string(),
            procedure: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
            policy_age: NOT_AVAILABLE.to_string(),
        }
    }
}

/// A clause mention grounded (or not) against the clause store
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedClause {
    /// Matched clause id, or `"N/A"` when nothing matched
    pub clause_id: String,
    /// Clause excerpt, or the original mention when nothing matched
    pub text: String,
    /// Page of the matched clause
    pub page: Option<u32>,
    /// Label of the originating document, `"Not found"` when nothing matched
    pub document: String,
    /// Overlap score rounded to two decimals, 0.0 when nothing matched
    pub relevance_score: f64,
}

impl MatchedClause {
    /// Document label carried by unmatched mentions
    pub const NOT_FOUND: &'static str = "Not found";

    /// Placeholder for a mention that matched no stored clause
    pub fn unmatched(mention: impl Into<String>) -> Self {
        Self {
            clause_id: NOT_AVAILABLE.to_string(),
            text: mention.into(),
            page: None,
            document: Self::NOT_FOUND.to_string(),
            relevance_score: 0.0,
        }
    }

    /// Whether this entry points at a stored clause
    pub fn is_matched(&self) -> bool {
        self.clause_id != NOT_AVAILABLE
    }
}

/// The outcome of one claim question
///
/// Decisions are created once and never modified; all fields are read
/// through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    id: DecisionId,
    query: String,
    verdict: Verdict,
    confidence: f64,
    amount: f64,
    justification: String,
    relevant_clauses: Vec<MatchedClause>,
    extracted_info: ExtractedInfo,
    generated_at_ms: u64,
}

impl Decision {
    /// Create a decision
    ///
    /// Confidence is clamped to [0, 1] and amount to >= 0. Non-finite
    /// values become 0.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DecisionId,
        query: String,
        verdict: Verdict,
        confidence: f64,
        amount: f64,
        justification: String,
        relevant_clauses: Vec<MatchedClause>,
        extracted_info: ExtractedInfo,
        generated_at_ms: u64,
    ) -> Self {
        let confidence = if confidence.is_finite() { confidence.clamp(0.0, 1.0) } else { 0.0 };
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        Self {
            id,
            query,
            verdict,
            confidence,
            amount,
            justification,
            relevant_clauses,
            extracted_info,
            generated_at_ms,
        }
    }

    /// Decision identifier
    pub fn id(&self) -> DecisionId {
        self.id
    }

    /// The question that was asked
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Approved, rejected or unknown
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Numeric confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Estimated payout, never negative
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Normalized justification narrative
    pub fn justification(&self) -> &str {
        &self.justification
    }

    /// Cited clauses in mention order
    pub fn relevant_clauses(&self) -> &[MatchedClause] {
        &self.relevant_clauses
    }

    /// Claimant details
    pub fn extracted_info(&self) -> &ExtractedInfo {
        &self.extracted_info
    }

    /// Generation time in unix milliseconds
    pub fn generated_at_ms(&self) -> u64 {
        self.generated_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(confidence: f64, amount: f64) -> Decision {
        Decision::new(
            DecisionId::new(),
            "knee surgery".to_string(),
            Verdict::Approved,
            confidence,
            amount,
            String::new(),
            Vec::new(),
            ExtractedInfo::default(),
            0,
        )
    }

    #[test]
    fn test_decision_clamps_values() {
        let d = decision(1.7, -20.0);
        assert_eq!(d.confidence(), 1.0);
        assert_eq!(d.amount(), 0.0);

        let d = decision(f64::NAN, f64::INFINITY);
        assert_eq!(d.confidence(), 0.0);
        assert_eq!(d.amount(), 0.0);
    }

    #[test]
    fn test_verdict_wire_forms() {
        for verdict in [Verdict::Approved, Verdict::Rejected, Verdict::Unknown] {
            assert_eq!(Verdict::from_wire(verdict.as_str()), Some(verdict));
        }
        assert_eq!(Verdict::Rejected.title(), "Rejected");
        assert_eq!(Verdict::from_wire("Approved"), None);
    }

    #[test]
    fn test_unmatched_placeholder() {
        let m = MatchedClause::unmatched("waiting period clause");
        assert_eq!(m.clause_id, "N/A");
        assert_eq!(m.document, "Not found");
        assert_eq!(m.page, None);
        assert_eq!(m.relevance_score, 0.0);
        assert!(!m.is_matched());
    }

    #[test]
    fn test_extracted_info_defaults_to_sentinel() {
        let info = ExtractedInfo::default();
        assert_eq!(info.age, NOT_AVAILABLE);
        assert_eq!(info.policy_age, NOT_AVAILABLE);
    }

    #[test]
    fn test_decision_id_display_and_parse() {
        let id = DecisionId::new();
        let parsed = DecisionId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(DecisionId::from_string("nope").is_err());
    }
}
