//! Confidence buckets reported by the language model

/// Ordinal confidence label (Low / Medium / High) and its numeric score
///
/// The numeric mapping is 0.4 / 0.6 / 0.95. An earlier revision of the
/// scoring used 0.75 for High; this crate follows the newer mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConfidenceBucket {
    /// Weak support in the policy text
    Low,
    /// Default when the model gives no usable label
    #[default]
    Medium,
    /// Strong support in the policy text
    High,
}

impl ConfidenceBucket {
    /// Parse a label case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Numeric confidence in [0, 1]
    pub fn score(&self) -> f64 {
        match self {
            Self::Low => 0.4,
            Self::Medium => 0.6,
            Self::High => 0.95,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores() {
        assert_eq!(ConfidenceBucket::Low.score(), 0.4);
        assert_eq!(ConfidenceBucket::Medium.score(), 0.6);
        assert_eq!(ConfidenceBucket::High.score(), 0.95);
    }

    #[test]
    fn test_from_label_is_case_insensitive() {
        assert_eq!(ConfidenceBucket::from_label("HIGH"), Some(ConfidenceBucket::High));
        assert_eq!(ConfidenceBucket::from_label(" low "), Some(ConfidenceBucket::Low));
        assert_eq!(ConfidenceBucket::from_label("certain"), None);
    }

    #[test]
    fn test_default_is_medium() {
        assert_eq!(ConfidenceBucket::default(), ConfidenceBucket::Medium);
    }
}
