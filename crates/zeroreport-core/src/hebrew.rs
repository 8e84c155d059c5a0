//! Hebrew-script presence check.

use crate::backend::ParsedDocument;

/// True for any code point in the Hebrew block (U+0590..=U+05FF).
pub fn is_hebrew(c: char) -> bool {
    matches!(c, '\u{0590}'..='\u{05FF}')
}

pub fn contains_hebrew(text: &str) -> bool {
    text.chars().any(is_hebrew)
}

/// Scan the text sample, or the metadata values when the sample is blank.
pub fn detect_hebrew(document: &ParsedDocument) -> bool {
    if !document.text_sample.trim().is_empty() {
        return contains_hebrew(&document.text_sample);
    }
    document.metadata.values().any(|v| contains_hebrew(v))
}
