//! Clause module - the addressable unit of policy text

use crate::document::DocumentId;
use std::fmt;

/// Identifier of a policy clause, formatted as `"C"` plus a zero-padded
/// three digit sequence (`C001`, `C002`, ...)
///
/// Sequences above 999 widen naturally (`C1000`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(String);

impl ClauseId {
    /// Build the identifier for a 1-based document-order sequence number
    ///
    /// # Examples
    ///
    /// ```
    /// use intelliclaim_domain::ClauseId;
    ///
    /// assert_eq!(ClauseId::from_sequence(1).as_str(), "C001");
    /// assert_eq!(ClauseId::from_sequence(42).as_str(), "C042");
    /// ```
    pub fn from_sequence(sequence: usize) -> Self {
        Self(format!("C{:03}", sequence))
    }

    /// Wrap an identifier read back from storage
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Sequence number encoded in the identifier, if it has the `C###` shape
    pub fn sequence(&self) -> Option<usize> {
        self.0.strip_prefix('C').and_then(|digits| digits.parse().ok())
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A titled span of policy text treated as one coverage unit
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Unique identifier across the store
    pub id: ClauseId,

    /// Document the clause was segmented from
    pub document_id: Option<DocumentId>,

    /// Heading text
    pub title: String,

    /// Clause body (never empty after trimming)
    pub body: String,

    /// Optional coverage category
    pub category: Option<String>,

    /// Optional page number in the source document
    pub page: Option<u32>,

    /// Ordered relevance keywords
    pub keywords: Vec<String>,

    /// When this clause was created (unix seconds)
    pub created_at: u64,
}

impl Clause {
    /// Create a clause with no document, category, page or keywords
    pub fn new(id: ClauseId, title: impl Into<String>, body: impl Into<String>, created_at: u64) -> Self {
        Self {
            id,
            document_id: None,
            title: title.into(),
            body: body.into(),
            category: None,
            page: None,
            keywords: Vec::new(),
            created_at,
        }
    }

    /// Attach the source document
    pub fn with_document(mut self, document_id: DocumentId) -> Self {
        self.document_id = Some(document_id);
        self
    }

    /// Attach the source page
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach a category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach keywords, keeping their order
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_id_padding() {
        assert_eq!(ClauseId::from_sequence(7).as_str(), "C007");
        assert_eq!(ClauseId::from_sequence(999).as_str(), "C999");
        assert_eq!(ClauseId::from_sequence(1000).as_str(), "C1000");
    }

    #[test]
    fn test_clause_id_sequence() {
        assert_eq!(ClauseId::from_sequence(12).sequence(), Some(12));
        assert_eq!(ClauseId::from_string("X12").sequence(), None);
        assert_eq!(ClauseId::from_string("Cabc").sequence(), None);
    }

    #[test]
    fn test_clause_builders() {
        let clause = Clause::new(ClauseId::from_sequence(1), "Exclusions", "Cosmetic surgery", 10)
            .with_document(DocumentId::new(3))
            .with_page(2)
            .with_category("exclusion")
            .with_keywords(vec!["cosmetic".to_string(), "surgery".to_string()]);

        assert_eq!(clause.document_id, Some(DocumentId::new(3)));
        assert_eq!(clause.page, Some(2));
        assert_eq!(clause.category.as_deref(), Some("exclusion"));
        assert_eq!(clause.keywords, vec!["cosmetic", "surgery"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the sequence survives formatting
        #[test]
        fn test_sequence_roundtrip(n in 1usize..100_000) {
            prop_assert_eq!(ClauseId::from_sequence(n).sequence(), Some(n));
        }

        /// Property: ids sort in sequence order below 1000
        #[test]
        fn test_ids_sort_by_sequence(a in 1usize..1000, b in 1usize..1000) {
            let (id_a, id_b) = (ClauseId::from_sequence(a), ClauseId::from_sequence(b));
            prop_assert_eq!(id_a < id_b, a < b);
        }
    }
}
