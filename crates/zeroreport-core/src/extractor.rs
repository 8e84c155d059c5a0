use std::collections::BTreeMap;

use thiserror::Error;

use crate::backend::{BackendError, PdfBackend};
use crate::hebrew::detect_hebrew;
use crate::metadata::MetadataValue;
use crate::types::{ExtractionRequest, ExtractionResult, HEBREW_DETECTED, Status};

/// Leading pages that feed the script-detection text sample.
pub const DEFAULT_MAX_TEXT_PAGES: usize = 10;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("document is empty (0 bytes)")]
    EmptyDocument,
    #[error("failed to parse document: {0}")]
    Parse(#[from] BackendError),
}

/// A record plus what the job needs to know about the document but does not
/// persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub result: ExtractionResult,
    /// The text sample held something besides whitespace. `false` for
    /// scanned documents without OCR and for ERROR records.
    pub text_found: bool,
}

impl Extraction {
    pub fn rejected(result: ExtractionResult) -> Self {
        Self {
            result,
            text_found: false,
        }
    }
}

/// Turns document bytes into an [`ExtractionResult`].
///
/// Performs no I/O of its own. Every failure is folded into an ERROR record
/// so the caller always has something to persist.
pub struct Extractor<'a> {
    backend: &'a dyn PdfBackend,
    max_text_pages: usize,
}

impl<'a> Extractor<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self {
            backend,
            max_text_pages: DEFAULT_MAX_TEXT_PAGES,
        }
    }

    /// Cap on pages scanned for text. Zero means metadata only.
    pub fn with_max_text_pages(mut self, pages: usize) -> Self {
        self.max_text_pages = pages;
        self
    }

    pub fn extract(&self, request: &ExtractionRequest, bytes: &[u8]) -> ExtractionResult {
        self.run(request, bytes).result
    }

    /// Like [`Extractor::extract`], also reporting whether any page text
    /// was found.
    pub fn run(&self, request: &ExtractionRequest, bytes: &[u8]) -> Extraction {
        match self.try_extract(request, bytes) {
            Ok(extraction) => extraction,
            Err(e) => Extraction::rejected(ExtractionResult::failure(
                request,
                bytes.len() as u64,
                e.to_string(),
            )),
        }
    }

    fn try_extract(
        &self,
        request: &ExtractionRequest,
        bytes: &[u8],
    ) -> Result<Extraction, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let parsed = self.backend.parse(bytes, self.max_text_pages)?;

        let text_found = !parsed.text_sample.trim().is_empty();
        let mut validations = BTreeMap::new();
        validations.insert(HEBREW_DETECTED.to_string(), detect_hebrew(&parsed));

        let metadata: BTreeMap<String, MetadataValue> = parsed
            .metadata
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k, MetadataValue::from_raw(v)))
            .collect();

        let result = ExtractionResult {
            status: Status::Ok,
            doc_id: request.doc_id(),
            bucket: request.source_bucket.clone(),
            key: request.source_key.clone(),
            size_bytes: bytes.len() as u64,
            pages: parsed.page_count,
            validations,
            metadata,
            error: None,
        };
        Ok(Extraction { result, text_found })
    }
}

/// Run the default [`Extractor`] over `bytes`.
pub fn extract(
    request: &ExtractionRequest,
    bytes: &[u8],
    backend: &dyn PdfBackend,
) -> ExtractionResult {
    Extractor::new(backend).extract(request, bytes)
}
