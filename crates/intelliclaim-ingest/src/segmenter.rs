//! Policy text segmentation into clauses

use intelliclaim_domain::{Clause, ClauseId};
use regex::Regex;
use std::sync::LazyLock;

/// Headings are either explicit `Section N[.M...]` / `Clause N[.M...]`
/// labels followed by `:`, `.` or whitespace, or short lines made of
/// letters and spaces that end in a colon.
static HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)\b(?:section|clause)\s+\d+(?:\.\d+)*[:.\s]|^[ \t]*[a-z][a-z \t]{0,79}:[ \t\r]*$")
        .expect("heading pattern is valid")
});

/// Splits raw document text into ordered clause records
#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseSegmenter {
    created_at: u64,
}

impl ClauseSegmenter {
    /// Create a segmenter stamping clauses with `created_at` (unix seconds)
    pub fn new(created_at: u64) -> Self {
        Self { created_at }
    }

    /// Segment `text`, numbering clauses from `C001`
    ///
    /// Returns an empty list when the text has no headings.
    pub fn segment(&self, text: &str) -> Vec<Clause> {
        self.segment_from(text, 1)
    }

    /// Segment `text`, numbering clauses from `first_sequence`
    ///
    /// Every heading match consumes a sequence number, so a heading whose
    /// body is empty leaves a gap.
    pub fn segment_from(&self, text: &str, first_sequence: usize) -> Vec<Clause> {
        let headings: Vec<_> = HEADING_PATTERN.find_iter(text).collect();

        headings
            .iter()
            .enumerate()
            .filter_map(|(idx, heading)| {
                let end = headings.get(idx + 1).map_or(text.len(), |next| next.start());
                let body = text[heading.end()..end].trim();
                let title = heading.as_str().replace(':', "");
                let title = title.trim();

                if body.is_empty() || title.is_empty() {
                    return None;
                }

                Some(Clause::new(
                    ClauseId::from_sequence(first_sequence + idx),
                    title,
                    body,
                    self.created_at,
                ))
            })
            .collect()
    }
}
