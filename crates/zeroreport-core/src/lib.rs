//! Metadata extraction and validation for single PDF documents.
//!
//! Everything in this crate is pure: bytes and identifiers in, an
//! [`ExtractionResult`] out. Fetching and persisting live in
//! `zeroreport-store`; the concrete PDF parser lives in
//! `zeroreport-pdf-mupdf`.

pub mod backend;
pub mod config_file;
pub mod doc_id;
pub mod extractor;
pub mod hebrew;
pub mod metadata;
pub mod staging;
pub mod types;

#[cfg(test)]
mod mock;

pub use backend::{BackendError, ParsedDocument, PdfBackend};
pub use doc_id::doc_id;
pub use extractor::{DEFAULT_MAX_TEXT_PAGES, ExtractError, Extraction, Extractor, extract};
pub use hebrew::contains_hebrew;
pub use metadata::MetadataValue;
pub use staging::{DEFAULT_STAGING_PREFIX, staging_key, today_utc};
pub use types::{ExtractionRequest, ExtractionResult, HEBREW_DETECTED, Status};
