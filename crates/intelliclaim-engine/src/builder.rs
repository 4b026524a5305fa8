//! Decision Record Builder and the caller-facing payload

use crate::parser::{compose_justification, ParsedResponse};
use chrono::{DateTime, SecondsFormat, Utc};
use intelliclaim_domain::{Decision, DecisionId, ExtractedInfo, MatchedClause};
use serde::{Deserialize, Serialize};

/// Assemble a decision from parser and matcher output
pub fn build_decision(
    query: &str,
    parsed: &ParsedResponse,
    relevant_clauses: Vec<MatchedClause>,
    currency_symbol: &str,
    generated_at_ms: u64,
) -> Decision {
    Decision::new(
        DecisionId::new(),
        query.trim().to_string(),
        parsed.verdict(),
        parsed.confidence(),
        parsed.amount(),
        compose_justification(parsed, currency_symbol),
        relevant_clauses,
        parsed.extracted_info(),
        generated_at_ms,
    )
}

/// ISO-8601 rendering of a millisecond unix timestamp
pub fn format_timestamp(ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decision summary block of the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictPayload {
    /// `approved`, `rejected` or `unknown`
    pub verdict: String,
    /// Narrative justification
    pub justification: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Estimated amount
    pub amount: f64,
}

/// Extracted claimant details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInfoPayload {
    /// Claimant age
    pub age: String,
    /// Claimant gender
    pub gender: String,
    /// Procedure
    pub procedure: String,
    /// Location
    pub location: String,
    /// Policy age
    pub policy_age: String,
}

/// One cited clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClausePayload {
    /// Clause id or `"N/A"`
    pub clause_id: String,
    /// Excerpt or original mention
    pub text: String,
    /// Page number
    pub page: Option<u32>,
    /// Document label
    pub document: String,
    /// Overlap score
    pub relevance_score: f64,
}

/// JSON shape returned to callers for one decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    /// Verdict, justification, confidence and amount
    pub decision: VerdictPayload,
    /// Generation time, ISO-8601
    pub timestamp: String,
    /// Claimant details
    pub extracted_info: ExtractedInfoPayload,
    /// Cited clauses
    pub relevant_clauses: Vec<ClausePayload>,
}

impl From<&ExtractedInfo> for ExtractedInfoPayload {
    fn from(info: &ExtractedInfo) -> Self {
        Self {
            age: info.age.clone(),
            gender: info.gender.clone(),
            procedure: info.procedure.clone(),
            location: info.location.clone(),
            policy_age: info.policy_age.clone(),
        }
    }
}

impl From<&MatchedClause> for ClausePayload {
    fn from(clause: &MatchedClause) -> Self {
        Self {
            clause_id: clause.clause_id.clone(),
            text: clause.text.clone(),
            page: clause.page,
            document: clause.document.clone(),
            relevance_score: clause.relevance_score,
        }
    }
}

impl From<&Decision> for DecisionPayload {
    fn from(decision: &Decision) -> Self {
        Self {
            decision: VerdictPayload {
                verdict: decision.verdict().as_str().to_string(),
                justification: decision.justification().to_string(),
                confidence: decision.confidence(),
                amount: decision.amount(),
            },
            timestamp: format_timestamp(decision.generated_at_ms()),
            extracted_info: decision.extracted_info().into(),
            relevant_clauses: decision.relevant_clauses().iter().map(ClausePayload::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_response;
    use intelliclaim_domain::Verdict;
    use serde_json::json;

    #[test]
    fn test_build_from_empty_answer() {
        let parsed = parse_response("");
        let decision = build_decision("  some question ", &parsed, Vec::new(), "₹", 0);

        assert_eq!(decision.query(), "some question");
        assert_eq!(decision.verdict(), Verdict::Unknown);
        assert_eq!(decision.confidence(), 0.6);
        assert_eq!(decision.amount(), 0.0);
        assert!(decision.relevant_clauses().is_empty());
        assert_eq!(decision.extracted_info(), &ExtractedInfo::default());
    }

    #[test]
    fn test_payload_shape() {
        let parsed = parse_response("**Claim:** REJECTED\n**Confidence:** Low\n**Policy Age:** 3 months");
        let decision = build_decision(
            "knee surgery",
            &parsed,
            vec![MatchedClause::unmatched("waiting period")],
            "₹",
            1_700_000_000_000,
        );

        let payload = serde_json::to_value(DecisionPayload::from(&decision)).unwrap();

        assert_eq!(payload["decision"]["verdict"], "rejected");
        assert!(payload["decision"].get("decision").is_none());
        assert_eq!(payload["decision"]["confidence"], 0.4);
        assert_eq!(payload["decision"]["amount"], 0.0);
        assert_eq!(payload["timestamp"], "2023-11-14T22:13:20.000Z");
        assert_eq!(payload["extractedInfo"]["policyAge"], "3 months");
        assert_eq!(payload["extractedInfo"]["age"], "N/A");
        assert_eq!(
            payload["relevantClauses"],
            json!([{
                "clauseId": "N/A",
                "text": "waiting period",
                "page": null,
                "document": "Not found",
                "relevanceScore": 0.0
            }])
        );
    }
}
