//! Clause Matcher: ground clause mentions against stored clauses

use crate::config::EngineConfig;
use intelliclaim_domain::traits::ClauseStore;
use intelliclaim_domain::{Clause, DocumentId, MatchedClause};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Document label used for clauses with no originating document
pub const UNKNOWN_DOCUMENT: &str = "Unknown";

fn tokens(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Read-only view of the clause store used for matching
#[derive(Debug, Clone, Default)]
pub struct ClauseSnapshot {
    clauses: Vec<(Clause, HashSet<String>)>,
    labels: HashMap<DocumentId, String>,
}

impl ClauseSnapshot {
    /// Build a snapshot from clauses in store order plus document labels
    pub fn new(clauses: Vec<Clause>, labels: HashMap<DocumentId, String>) -> Self {
        let clauses = clauses
            .into_iter()
            .map(|clause| {
                let body_tokens = tokens(&clause.body);
                (clause, body_tokens)
            })
            .collect();
        Self { clauses, labels }
    }

    /// Load every clause and document label from a store
    pub fn load<S: ClauseStore>(store: &S) -> Result<Self, S::Error> {
        let clauses = store.list_clauses()?;
        let labels = store.document_labels()?;
        Ok(Self::new(clauses, labels))
    }

    /// Number of clauses
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the snapshot holds no clauses
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Clauses in store order
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().map(|(clause, _)| clause)
    }

    fn document_label(&self, clause: &Clause) -> &str {
        clause
            .document_id
            .and_then(|id| self.labels.get(&id))
            .map_or(UNKNOWN_DOCUMENT, String::as_str)
    }
}

/// Lexical overlap matcher
#[derive(Debug, Clone, Copy)]
pub struct ClauseMatcher {
    threshold: f64,
    excerpt_chars: usize,
}

impl Default for ClauseMatcher {
    fn default() -> Self {
        Self::new(0.3, 300)
    }
}

impl ClauseMatcher {
    /// Create a matcher accepting scores strictly above `threshold`
    pub fn new(threshold: f64, excerpt_chars: usize) -> Self {
        Self {
            threshold,
            excerpt_chars,
        }
    }

    /// Matcher using the engine's threshold and excerpt length
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.match_threshold, config.excerpt_chars)
    }

    /// Overlap score of a mention against a clause body
    ///
    /// Distinct lowercased tokens shared by both, divided by the number of
    /// whitespace tokens in the mention (at least 1).
    pub fn score(mention: &str, body: &str) -> f64 {
        Self::score_tokens(mention, &tokens(body))
    }

    fn score_tokens(mention: &str, body_tokens: &HashSet<String>) -> f64 {
        let mention_len = mention.split_whitespace().count().max(1);
        let common = tokens(mention).intersection(body_tokens).count();
        common as f64 / mention_len as f64
    }

    fn excerpt(&self, body: &str) -> String {
        match body.char_indices().nth(self.excerpt_chars) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        }
    }

    /// Ground a single mention
    ///
    /// The highest-scoring clause wins, with ties going to the clause
    /// seen first. Scores at or below the threshold yield an unmatched
    /// placeholder.
    pub fn match_mention(&self, mention: &str, snapshot: &ClauseSnapshot) -> MatchedClause {
        let mut best: Option<&Clause> = None;
        let mut best_score = 0.0;

        for (clause, body_tokens) in &snapshot.clauses {
            let score = Self::score_tokens(mention, body_tokens);
            if score > best_score {
                best_score = score;
                best = Some(clause);
            }
        }

        match best {
            Some(clause) if best_score > self.threshold => {
                debug!("Mention '{}' matched {} ({:.2})", mention, clause.id, best_score);
                MatchedClause {
                    clause_id: clause.id.to_string(),
                    text: self.excerpt(&clause.body),
                    page: clause.page,
                    document: snapshot.document_label(clause).to_string(),
                    relevance_score: (best_score * 100.0).round() / 100.0,
                }
            }
            _ => {
                debug!("Mention '{}' matched nothing (best {:.2})", mention, best_score);
                MatchedClause::unmatched(mention)
            }
        }
    }

    /// Ground every mention, preserving order
    pub fn match_all(&self, mentions: &[String], snapshot: &ClauseSnapshot) -> Vec<MatchedClause> {
        mentions
            .iter()
            .map(|mention| self.match_mention(mention, snapshot))
            .collect()
    }
}
