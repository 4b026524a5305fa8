//! Integration tests for intelliclaim-engine
//!
//! These tests run the full pipeline: ingest a policy into SQLite, load
//! the policy context, and decide questions with a mock LLM.

use intelliclaim_domain::traits::{DecisionStore, DocumentStore};
use intelliclaim_domain::{DocumentFormat, Verdict};
use intelliclaim_engine::{
    BatchItem, DecisionEngine, DecisionPayload, EngineConfig, EngineError, PolicyContext,
};
use intelliclaim_ingest::{Ingestor, PlainTextExtractor};
use intelliclaim_llm::MockProvider;
use intelliclaim_store::SqliteStore;

const POLICY: &str = "\
Section 1: Coverage
Inpatient hospitalisation and day-care procedures are covered up to the sum insured.

Section 2: Waiting Period
Planned knee surgery is covered only after a waiting period of 24 months.

Section 3: Exclusions
Coverage excludes cosmetic surgery except reconstruction after an accident.
";

const KNEE_ANSWER: &str = "\
**Claim:** REJECTED
**Reason:** The policy is only 3 months old and knee surgery has a 24 month waiting period.
**Relevant Clauses:**
- knee surgery waiting period of 24 months
- maternity benefits
**Confidence:** High
**Estimated Amount:** 0
**Age:** 46
**Gender:** Male
**Procedure:** Knee surgery
**Location:** Pune
**Policy Age:** 3 months
";

fn ingested_store() -> SqliteStore {
    let mut store = SqliteStore::in_memory().unwrap();
    Ingestor::new(PlainTextExtractor::new())
        .ingest(&mut store, "gold-plan.txt", POLICY.as_bytes(), DocumentFormat::Txt)
        .unwrap();
    store
}

#[test]
fn test_context_requires_a_document() {
    let store = SqliteStore::in_memory().unwrap();
    let result = PolicyContext::load(&store);
    assert!(matches!(result, Err(EngineError::PolicyUnavailable(_))));
}

#[test]
fn test_context_loads_latest_document_and_clauses() {
    let store = ingested_store();
    let context = PolicyContext::load(&store).unwrap();

    assert_eq!(context.document_name(), "gold-plan.txt");
    assert_eq!(context.snapshot().len(), 3);
    assert!(context.policy_text().contains("cosmetic surgery"));
}

#[tokio::test]
async fn test_decision_cites_stored_clauses() {
    let mut store = ingested_store();
    let context = PolicyContext::load(&store).unwrap();

    let mut llm = MockProvider::default();
    llm.add_response("knee surgery, Pune", KNEE_ANSWER);
    let engine = DecisionEngine::new(llm, EngineConfig::default()).unwrap();

    let decision = engine
        .decide("46M, knee surgery, Pune, 3-month policy", &context)
        .await
        .unwrap();

    assert_eq!(decision.verdict(), Verdict::Rejected);
    assert_eq!(decision.confidence(), 0.95);
    assert_eq!(decision.extracted_info().location, "Pune");

    let cited = decision.relevant_clauses();
    assert_eq!(cited.len(), 2);
    assert_eq!(cited[0].clause_id, "C002");
    assert_eq!(cited[0].document, "gold-plan.txt");
    assert!(!cited[1].is_matched());
    assert_eq!(cited[1].text, "maternity benefits");

    let payload = serde_json::to_value(DecisionPayload::from(&decision)).unwrap();
    assert_eq!(payload["decision"]["verdict"], "rejected");
    assert_eq!(payload["relevantClauses"][0]["clauseId"], "C002");

    store.save_decision(&decision, 42).unwrap();
    let history = store.recent_decisions(5).unwrap();
    assert_eq!(history, vec![decision]);
}

#[tokio::test]
async fn test_batch_survives_a_failing_question() {
    let store = ingested_store();
    let context = PolicyContext::load(&store).unwrap();

    let mut llm = MockProvider::new("**Claim:** APPROVED\n**Estimated Amount:** ₹45,000");
    llm.add_error("dental implant");
    let engine = DecisionEngine::new(llm, EngineConfig::fast()).unwrap();

    let queries = vec![
        "appendix removal, 30F".to_string(),
        "dental implant, 52M".to_string(),
        "cataract surgery, 67F".to_string(),
    ];
    let result = engine.decide_batch(&queries, &context).await;

    assert_eq!(result.items.len(), 3);
    assert!(result.items[0].decision().is_some());
    assert!(matches!(&result.items[1], BatchItem::Failed { .. }));
    assert_eq!(result.items[1].query(), "dental implant, 52M");
    assert!(result.items[2].decision().is_some());

    assert_eq!(result.summary.approved, 2);
    assert_eq!(result.summary.failed, 1);
    assert_eq!(result.summary.total_amount, 90_000.0);
}

#[tokio::test]
async fn test_newer_document_supplies_policy_text() {
    let mut store = ingested_store();
    Ingestor::new(PlainTextExtractor::new())
        .ingest(
            &mut store,
            "silver-plan.txt",
            b"Section 1: Coverage\nOnly accidental injuries are covered.\n",
            DocumentFormat::Txt,
        )
        .unwrap();

    let context = PolicyContext::load(&store).unwrap();
    assert_eq!(context.document_name(), "silver-plan.txt");
    assert_eq!(store.latest_document().unwrap().unwrap().name, "silver-plan.txt");
    // Clauses from both documents stay matchable
    assert_eq!(context.snapshot().len(), 4);
}
