use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
}

/// What a backend recovers from a PDF buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub page_count: u32,
    /// Raw info-dictionary fields keyed by their PDF name (`Title`, `CreationDate`, ...).
    pub metadata: BTreeMap<String, String>,
    /// Text of the leading pages, joined with newlines. May be blank for
    /// scanned documents.
    pub text_sample: String,
}

/// Trait for PDF parsing backends.
///
/// Implementors work on an in-memory buffer and must release every handle
/// they open before returning, on success and on failure alike. The
/// validation logic built on top lives in [`crate::extractor::Extractor`].
pub trait PdfBackend: Send + Sync {
    /// Parse `bytes`, collecting text from at most `max_text_pages` pages.
    fn parse(&self, bytes: &[u8], max_text_pages: usize) -> Result<ParsedDocument, BackendError>;
}
