//! Decision engine: synthesizer, parser, matcher and builder in sequence

use crate::builder::build_decision;
use crate::config::EngineConfig;
use crate::error::{EngineError, SynthesisError};
use crate::matcher::{ClauseMatcher, ClauseSnapshot};
use crate::parser::parse_response;
use crate::synthesizer::Synthesizer;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use intelliclaim_domain::traits::{ClauseStore, DocumentStore, LlmProvider};
use intelliclaim_domain::{Decision, Verdict};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Policy text and clause snapshot every question is decided against
#[derive(Debug, Clone)]
pub struct PolicyContext {
    document_name: String,
    policy_text: String,
    snapshot: Arc<ClauseSnapshot>,
}

impl PolicyContext {
    /// Create a context from already loaded parts
    pub fn new(
        document_name: impl Into<String>,
        policy_text: impl Into<String>,
        snapshot: ClauseSnapshot,
    ) -> Self {
        Self {
            document_name: document_name.into(),
            policy_text: policy_text.into(),
            snapshot: Arc::new(snapshot),
        }
    }

    /// Load the latest document's text and every stored clause
    ///
    /// Fails with [`EngineError::PolicyUnavailable`] when no document
    /// with usable text has been ingested.
    pub fn load<S>(store: &S) -> Result<Self, EngineError>
    where
        S: ClauseStore + DocumentStore,
        <S as ClauseStore>::Error: Display,
        <S as DocumentStore>::Error: Display,
    {
        let document = store
            .latest_document()
            .map_err(|e| EngineError::Store(e.to_string()))?
            .ok_or_else(|| EngineError::PolicyUnavailable("no policy document has been ingested".to_string()))?;

        if document.extracted_text.trim().is_empty() {
            return Err(EngineError::PolicyUnavailable(format!(
                "document '{}' has no extracted text",
                document.name
            )));
        }

        let snapshot = ClauseSnapshot::load(store).map_err(|e| EngineError::Store(e.to_string()))?;
        info!(
            "Loaded policy '{}' ({} chars) with {} clauses",
            document.name,
            document.extracted_text.len(),
            snapshot.len()
        );

        Ok(Self {
            document_name: document.name,
            policy_text: document.extracted_text,
            snapshot: Arc::new(snapshot),
        })
    }

    /// Name of the document supplying the policy text
    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// Raw policy text
    pub fn policy_text(&self) -> &str {
        &self.policy_text
    }

    /// Clause snapshot
    pub fn snapshot(&self) -> &ClauseSnapshot {
        &self.snapshot
    }
}

/// One slot of a batch result
#[derive(Debug, Clone, PartialEq)]
pub enum BatchItem {
    /// The question was decided
    Decided(Decision),
    /// The question failed; the rest of the batch was unaffected
    Failed {
        /// Question text
        query: String,
        /// Failure message
        error: String,
    },
}

impl BatchItem {
    /// Decision, if this slot succeeded
    pub fn decision(&self) -> Option<&Decision> {
        match self {
            BatchItem::Decided(decision) => Some(decision),
            BatchItem::Failed { .. } => None,
        }
    }

    /// Question text of this slot
    pub fn query(&self) -> &str {
        match self {
            BatchItem::Decided(decision) => decision.query(),
            BatchItem::Failed { query, .. } => query,
        }
    }
}

/// Counts over a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Questions submitted
    pub total: usize,
    /// Approved decisions
    pub approved: usize,
    /// Rejected decisions
    pub rejected: usize,
    /// Decisions with no recognizable verdict
    pub unknown: usize,
    /// Questions that failed
    pub failed: usize,
    /// Sum of estimated amounts over successful decisions
    pub total_amount: f64,
}

impl BatchSummary {
    fn from_items(items: &[BatchItem]) -> Self {
        let mut summary = BatchSummary {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            match item.decision() {
                Some(decision) => {
                    match decision.verdict() {
                        Verdict::Approved => summary.approved += 1,
                        Verdict::Rejected => summary.rejected += 1,
                        Verdict::Unknown => summary.unknown += 1,
                    }
                    summary.total_amount += decision.amount();
                }
                None => summary.failed += 1,
            }
        }
        summary
    }
}

/// Ordered batch results plus summary
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// One slot per question, in input order
    pub items: Vec<BatchItem>,
    /// Aggregate counts
    pub summary: BatchSummary,
}

/// Decides claim questions against a policy
pub struct DecisionEngine<L> {
    synthesizer: Synthesizer<L>,
    matcher: ClauseMatcher,
    config: EngineConfig,
}

impl<L> DecisionEngine<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create an engine, validating the configuration
    pub fn new(llm_provider: L, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self {
            synthesizer: Synthesizer::new(llm_provider, config.clone()),
            matcher: ClauseMatcher::from_config(&config),
            config,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide a single question
    #[instrument(skip(self, context), fields(document = %context.document_name()))]
    pub async fn decide(&self, query: &str, context: &PolicyContext) -> Result<Decision, EngineError> {
        if query.trim().is_empty() {
            return Err(SynthesisError::EmptyQuery.into());
        }

        let raw = self.synthesizer.synthesize(query, context.policy_text()).await?;
        let parsed = parse_response(&raw);
        let matched = self.matcher.match_all(parsed.mentions(), context.snapshot());

        let decision = build_decision(query, &parsed, matched, &self.config.currency_symbol, now_ms());
        info!(
            "Decision {}: {} (confidence {:.2}, {} clauses cited)",
            decision.id(),
            decision.verdict(),
            decision.confidence(),
            decision.relevant_clauses().iter().filter(|c| c.is_matched()).count()
        );

        Ok(decision)
    }

    /// Decide many questions with bounded concurrency
    ///
    /// A failing question becomes a [`BatchItem::Failed`] in its own slot;
    /// output order matches input order.
    pub async fn decide_batch(&self, queries: &[String], context: &PolicyContext) -> BatchResult {
        info!("Processing batch of {} questions", queries.len());

        let items: Vec<BatchItem> = stream::iter(queries)
            .map(|query| async move {
                match self.decide(query, context).await {
                    Ok(decision) => BatchItem::Decided(decision),
                    Err(e) => {
                        warn!("Question '{}' failed: {}", query, e);
                        BatchItem::Failed {
                            query: query.clone(),
                            error: e.to_string(),
                        }
                    }
                }
            })
            .buffered(self.config.batch_concurrency)
            .collect()
            .await;

        let summary = BatchSummary::from_items(&items);
        info!(
            "Batch complete: {} approved, {} rejected, {} unknown, {} failed",
            summary.approved, summary.rejected, summary.unknown, summary.failed
        );

        BatchResult { items, summary }
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelliclaim_domain::{Clause, ClauseId};
    use intelliclaim_llm::MockProvider;
    use std::collections::HashMap;

    fn context() -> PolicyContext {
        let clauses = vec![Clause::new(
            ClauseId::from_sequence(1),
            "Exclusions",
            "Coverage excludes cosmetic surgery except reconstruction",
            0,
        )];
        PolicyContext::new("policy.txt", "Exclusions: cosmetic surgery", ClauseSnapshot::new(clauses, HashMap::new()))
    }

    #[tokio::test]
    async fn test_decide_end_to_end() {
        let llm = MockProvider::new(
            "**Claim:** REJECTED\n**Reason:** Cosmetic work is excluded.\n**Relevant Clauses:**\n- cosmetic surgery exclusion clause\n**Confidence:** High\n**Estimated Amount:** 0",
        );
        let engine = DecisionEngine::new(llm, EngineConfig::default()).unwrap();

        let decision = engine.decide("nose job, 30F, Mumbai", &context()).await.unwrap();

        assert_eq!(decision.verdict(), Verdict::Rejected);
        assert_eq!(decision.confidence(), 0.95);
        assert_eq!(decision.relevant_clauses().len(), 1);
        assert_eq!(decision.relevant_clauses()[0].clause_id, "C001");
        assert_eq!(decision.relevant_clauses()[0].relevance_score, 0.5);
    }

    #[tokio::test]
    async fn test_decision_is_stamped_with_wall_clock() {
        let engine = DecisionEngine::new(MockProvider::default(), EngineConfig::default()).unwrap();
        let before = Utc::now().timestamp_millis() as u64;

        let decision = engine.decide("knee surgery", &context()).await.unwrap();

        let after = Utc::now().timestamp_millis() as u64;
        assert!((before..=after).contains(&decision.generated_at_ms()));
    }

    #[tokio::test]
    async fn test_decide_rejects_empty_query() {
        let engine = DecisionEngine::new(MockProvider::default(), EngineConfig::default()).unwrap();
        let result = engine.decide(" ", &context()).await;
        assert!(matches!(result, Err(EngineError::Synthesis(SynthesisError::EmptyQuery))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            batch_concurrency: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            DecisionEngine::new(MockProvider::default(), config),
            Err(EngineError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_batch_is_fail_soft_and_ordered() {
        let mut llm = MockProvider::new("**Claim:** APPROVED\n**Estimated Amount:** 1,000");
        llm.add_error("second question");
        llm.add_response("third question", "**Claim:** REJECTED");
        let engine = DecisionEngine::new(llm, EngineConfig::default()).unwrap();

        let queries = vec![
            "first question".to_string(),
            "second question".to_string(),
            "third question".to_string(),
        ];
        let result = engine.decide_batch(&queries, &context()).await;

        assert_eq!(result.items.len(), 3);
        assert_eq!(result.items[0].decision().map(|d| d.verdict()), Some(Verdict::Approved));
        assert!(matches!(&result.items[1], BatchItem::Failed { query, .. } if query == "second question"));
        assert_eq!(result.items[2].decision().map(|d| d.verdict()), Some(Verdict::Rejected));

        assert_eq!(
            result.summary,
            BatchSummary {
                total: 3,
                approved: 1,
                rejected: 1,
                unknown: 0,
                failed: 1,
                total_amount: 1000.0,
            }
        );
    }
}
