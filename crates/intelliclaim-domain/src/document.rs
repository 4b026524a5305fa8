//! Ingested policy documents and text-extraction results

use std::fmt;

/// Store-assigned identifier of an ingested document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(i64);

impl DocumentId {
    /// Wrap a raw row identifier
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw row identifier
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared format of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Portable Document Format
    Pdf,
    /// Word document
    Docx,
    /// Outlook message
    Msg,
    /// RFC 822 e-mail
    Eml,
    /// Plain text
    Txt,
}

impl DocumentFormat {
    /// Infer the format from a file extension (case-insensitive, with or without a dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" => Some(Self::Docx),
            "msg" => Some(Self::Msg),
            "eml" => Some(Self::Eml),
            "txt" | "text" | "md" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Msg => "msg",
            Self::Eml => "eml",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata reported by the text-extraction collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMetadata {
    /// Page count (0 on failure)
    pub pages: u32,
    /// Extraction confidence in [0, 1]
    pub confidence: f64,
    /// Detected language, `"unknown"` on failure
    pub language: String,
    /// Human-readable processing time such as `"0.9s"`
    pub processing_time: String,
    /// Failure description, if extraction failed
    pub error: Option<String>,
}

impl ExtractionMetadata {
    /// Metadata describing a failed extraction
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            pages: 0,
            confidence: 0.0,
            language: "unknown".to_string(),
            processing_time: "0s".to_string(),
            error: Some(error.into()),
        }
    }
}

/// Text plus metadata produced from a document byte stream
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    /// Extracted text, empty on failure
    pub text: String,
    /// Extraction metadata
    pub metadata: ExtractionMetadata,
}

impl ExtractedText {
    /// Failed extraction: empty text with failure metadata
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            metadata: ExtractionMetadata::failed(error),
        }
    }

    /// Whether there is usable text
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A document about to be stored
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// File name
    pub name: String,
    /// Declared format
    pub format: DocumentFormat,
    /// Size of the original byte stream
    pub size: u64,
    /// Extracted text plus metadata
    pub extracted: ExtractedText,
}

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store identifier
    pub id: DocumentId,
    /// File name
    pub name: String,
    /// Declared format
    pub format: DocumentFormat,
    /// Size of the original byte stream
    pub size: u64,
    /// Extracted text
    pub extracted_text: String,
    /// Extraction metadata
    pub metadata: ExtractionMetadata,
    /// Upload time (unix seconds)
    pub uploaded_at: u64,
}

impl Document {
    /// Whitespace-delimited word count of the extracted text
    pub fn word_count(&self) -> usize {
        self.extracted_text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension(".eml"), Some(DocumentFormat::Eml));
        assert_eq!(DocumentFormat::from_extension("doc"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("xlsx"), None);
    }

    #[test]
    fn test_failed_extraction_shape() {
        let failed = ExtractedText::failed("corrupt stream");
        assert!(!failed.has_text());
        assert_eq!(failed.metadata.pages, 0);
        assert_eq!(failed.metadata.confidence, 0.0);
        assert_eq!(failed.metadata.language, "unknown");
        assert_eq!(failed.metadata.error.as_deref(), Some("corrupt stream"));
    }
}
