use std::collections::BTreeMap;

use mupdf::{Document, MetadataName, TextPageFlags};

use zeroreport_core::{BackendError, ParsedDocument, PdfBackend};

/// The PDF header may be preceded by junk, but only within the first KiB.
const HEADER_WINDOW: usize = 1024;
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Info-dictionary fields copied into the record, keyed by PDF name.
const INFO_FIELDS: [(&str, MetadataName); 8] = [
    ("Title", MetadataName::Title),
    ("Author", MetadataName::Author),
    ("Subject", MetadataName::Subject),
    ("Keywords", MetadataName::Keywords),
    ("Creator", MetadataName::Creator),
    ("Producer", MetadataName::Producer),
    ("CreationDate", MetadataName::CreationDate),
    ("ModDate", MetadataName::ModDate),
];

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the extractor and storage code do not
/// transitively depend on it.
///
/// MuPDF repairs damaged files aggressively and will happily "open" arbitrary
/// bytes, so buffers without a `%PDF-` header are rejected up front.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_WINDOW)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

impl PdfBackend for MupdfBackend {
    fn parse(&self, bytes: &[u8], max_text_pages: usize) -> Result<ParsedDocument, BackendError> {
        if !has_pdf_header(bytes) {
            return Err(BackendError::OpenError(
                "no %PDF- header in the first 1024 bytes".into(),
            ));
        }

        let document = Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        let page_count = document
            .page_count()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        let page_count = u32::try_from(page_count)
            .map_err(|_| BackendError::OpenError(format!("invalid page count {}", page_count)))?;

        let mut metadata = BTreeMap::new();
        for (field, name) in INFO_FIELDS {
            match document.metadata(name) {
                Ok(value) if !value.is_empty() => {
                    metadata.insert(field.to_string(), value);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(field, error = %e, "metadata lookup failed"),
            }
        }

        let take = (page_count as usize).min(max_text_pages);
        let mut pages_text = Vec::with_capacity(take);
        for index in 0..take {
            let page = document
                .load_page(index as i32)
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        Ok(ParsedDocument {
            page_count,
            metadata,
            text_sample: pages_text.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_at_start() {
        assert!(has_pdf_header(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n"));
    }

    #[test]
    fn header_after_leading_junk() {
        let mut bytes = vec![b' '; 200];
        bytes.extend_from_slice(b"%PDF-1.4");
        assert!(has_pdf_header(&bytes));
    }

    #[test]
    fn header_beyond_window_rejected() {
        let mut bytes = vec![0u8; HEADER_WINDOW];
        bytes.extend_from_slice(b"%PDF-1.4");
        assert!(!has_pdf_header(&bytes));
    }

    #[test]
    fn random_bytes_rejected_without_opening() {
        let junk: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();
        let err = MupdfBackend::new().parse(&junk, 10).unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }
}
