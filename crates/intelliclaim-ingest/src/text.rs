//! Text extraction for plain-text and e-mail documents

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use intelliclaim_domain::traits::TextExtractor;
use intelliclaim_domain::{DocumentFormat, ExtractedText, ExtractionMetadata};
use tracing::{debug, warn};

/// Extractor for formats that need no binary decoding
///
/// Handles `txt` and `eml`. PDF, DOCX and MSG come back as failed
/// extractions so callers see a structured "unsupported" error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], format: DocumentFormat) -> ExtractedText {
        let text = match format {
            DocumentFormat::Txt => String::from_utf8_lossy(bytes).into_owned(),
            DocumentFormat::Eml => extract_eml(&String::from_utf8_lossy(bytes)),
            DocumentFormat::Pdf | DocumentFormat::Docx | DocumentFormat::Msg => {
                warn!("No extractor available for {} documents", format);
                return ExtractedText::failed(format!("{} extraction is not supported", format));
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return ExtractedText::failed("document contains no text");
        }

        let pages = text.split('\x0c').filter(|page| !page.trim().is_empty()).count().max(1) as u32;
        debug!("Extracted {} chars over {} page(s) from {} document", text.len(), pages, format);

        ExtractedText {
            metadata: ExtractionMetadata {
                pages,
                confidence: if text.len() > 50 { 0.97 } else { 0.3 },
                language: "en".to_string(),
                processing_time: format!("{:.1}s", pages as f64 * 0.3),
                error: None,
            },
            text,
        }
    }
}

/// Split a message into (headers, body) at the first blank line
fn split_message(raw: &str) -> (&str, &str) {
    for separator in ["\r\n\r\n", "\n\n"] {
        if let Some(idx) = raw.find(separator) {
            return (&raw[..idx], &raw[idx + separator.len()..]);
        }
    }
    (raw, "")
}

/// Look up a header value, unfolding continuation lines
fn header(headers: &str, name: &str) -> Option<String> {
    let mut value: Option<String> = None;
    for line in headers.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with([' ', '\t']) {
            if let Some(v) = value.as_mut() {
                v.push(' ');
                v.push_str(line.trim());
            }
            continue;
        }
        if value.is_some() {
            break;
        }
        if let Some((key, rest)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case(name) {
                value = Some(rest.trim().to_string());
            }
        }
    }
    value.filter(|v| !v.is_empty())
}

/// Value of a `key=value` parameter inside a header such as Content-Type
fn header_param(value: &str, key: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        k.trim()
            .eq_ignore_ascii_case(key)
            .then(|| v.trim().trim_matches('"').to_string())
    })
}

fn decode_quoted_printable(body: &str) -> String {
    let joined = body.replace("=\r\n", "").replace("=\n", "");
    let bytes = joined.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'=' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Decode a base64 body; line breaks between encoded lines are ignored
fn decode_base64(body: &str) -> Option<String> {
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Skipping malformed base64 text part: {}", e);
            None
        }
    }
}

/// Decode a single MIME entity's body if it is text/plain
fn text_part(headers: &str, body: &str) -> Option<String> {
    let content_type = header(headers, "Content-Type").unwrap_or_else(|| "text/plain".to_string());
    if !content_type.to_lowercase().starts_with("text/plain") {
        return None;
    }

    let encoding = header(headers, "Content-Transfer-Encoding")
        .unwrap_or_default()
        .to_lowercase();
    match encoding.as_str() {
        "quoted-printable" => Some(decode_quoted_printable(body)),
        "base64" => decode_base64(body),
        _ => Some(body.to_string()),
    }
}

/// Collect text/plain bodies, descending into nested multiparts
fn collect_text(headers: &str, body: &str, parts: &mut Vec<String>) {
    let content_type = header(headers, "Content-Type").unwrap_or_default();
    let boundary = content_type
        .to_lowercase()
        .starts_with("multipart/")
        .then(|| header_param(&content_type, "boundary"))
        .flatten();

    let Some(boundary) = boundary else {
        if let Some(text) = text_part(headers, body) {
            parts.push(text.trim().to_string());
        }
        return;
    };

    let delimiter = format!("--{}", boundary);
    let closing = format!("--{}--", boundary);
    for section in body.split(delimiter.as_str()).skip(1) {
        if section.trim_start().starts_with("--") || section.trim() == closing {
            break;
        }
        let section = section.trim_start_matches(['\r', '\n']);
        let (part_headers, part_body) = split_message(section);
        collect_text(part_headers, part_body, parts);
    }
}

/// Render an RFC 822 message as `From:` / `Subject:` lines plus its text bodies
fn extract_eml(raw: &str) -> String {
    let (headers, body) = split_message(raw);
    let mut lines = Vec::new();

    if let Some(from) = header(headers, "From") {
        lines.push(format!("From: {}", from));
    }
    if let Some(subject) = header(headers, "Subject") {
        lines.push(format!("Subject: {}", subject));
    }
    collect_text(headers, body, &mut lines);

    lines.retain(|line| !line.is_empty());
    lines.join("\n")
}
