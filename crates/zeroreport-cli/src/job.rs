//! One sequential ingest run: preflight, fetch, extract, persist.

use anyhow::Context;
use chrono::NaiveDate;

use zeroreport_core::{
    Extraction, ExtractionRequest, ExtractionResult, Extractor, PdfBackend, staging_key,
};
use zeroreport_store::{ObjectStore, ObjectUri, StoreError};

use crate::params::JobParams;

pub const EXIT_OK: u8 = 0;
/// The record was written but carries `status = ERROR`.
pub const EXIT_ERROR_RECORD: u8 = 3;
/// OK record whose leading pages hold no text while `require_text` is set.
pub const EXIT_NO_TEXT: u8 = 4;
/// OK record without Hebrew text while `require_hebrew` is set.
pub const EXIT_NO_HEBREW: u8 = 5;

const RECORD_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub result: ExtractionResult,
    /// Any text came out of the leading pages. Not part of the record.
    pub text_found: bool,
    pub ingest_date: NaiveDate,
    pub output: ObjectUri,
}

impl JobOutcome {
    pub fn exit_code(&self, params: &JobParams) -> u8 {
        if !self.result.is_ok() {
            EXIT_ERROR_RECORD
        } else if params.require_text && !self.text_found {
            EXIT_NO_TEXT
        } else if params.require_hebrew && !self.result.hebrew_detected() {
            EXIT_NO_HEBREW
        } else {
            EXIT_OK
        }
    }
}

enum Fetched {
    Document(Vec<u8>),
    /// Input problem found before extraction; the record is already built.
    Rejected(ExtractionResult),
}

/// Run the job against `store`.
///
/// Input problems (wrong extension, malformed key, missing or undersized
/// object, unparseable bytes) still produce a persisted ERROR record. Other
/// storage failures abort before anything is written.
pub async fn run_job(
    store: &dyn ObjectStore,
    backend: &dyn PdfBackend,
    params: &JobParams,
    ingest_date: NaiveDate,
) -> anyhow::Result<JobOutcome> {
    let request = params.request();

    let Extraction { result, text_found } = match fetch(store, params, &request).await? {
        Fetched::Rejected(result) => Extraction::rejected(result),
        Fetched::Document(bytes) => {
            tracing::info!(size_bytes = bytes.len(), "fetched document");
            Extractor::new(backend)
                .with_max_text_pages(params.max_text_pages)
                .run(&request, &bytes)
        }
    };
    if result.is_ok() && !text_found {
        tracing::warn!(doc_id = %result.doc_id, "no extractable text in leading pages");
    }

    if let Some(error) = &result.error {
        tracing::warn!(doc_id = %result.doc_id, %error, "extraction produced an error record");
    }

    let key = staging_key(&request.staging_prefix, ingest_date, &result.doc_id);
    let body = result
        .to_json_pretty()
        .context("failed to serialize extraction record")?
        .into_bytes();
    store
        .put(&params.out_bucket, &key, body, RECORD_CONTENT_TYPE)
        .await
        .with_context(|| format!("failed to write s3://{}/{}", params.out_bucket, key))?;

    let output = ObjectUri::new(params.out_bucket.clone(), key);
    tracing::info!(%output, status = ?result.status, "wrote metadata record");

    Ok(JobOutcome {
        result,
        text_found,
        ingest_date,
        output,
    })
}

async fn fetch(
    store: &dyn ObjectStore,
    params: &JobParams,
    request: &ExtractionRequest,
) -> Result<Fetched, StoreError> {
    let bucket = &params.source_bucket;
    let key = &params.source_key;

    if !key.to_lowercase().ends_with(".pdf") {
        tracing::warn!(%key, "source key is not a .pdf");
        return Ok(Fetched::Rejected(ExtractionResult::failure(
            request,
            0,
            format!("object key does not end with .pdf: {}", key),
        )));
    }

    let info = match store.head(bucket, key).await {
        Ok(info) => info,
        Err(e) if e.is_input_error() => return Ok(Fetched::Rejected(rejected(request, &e))),
        Err(e) => return Err(e),
    };
    tracing::debug!(size = info.size, etag = ?info.etag, "source object");

    if params.min_object_bytes > 0 && info.size < params.min_object_bytes {
        return Ok(Fetched::Rejected(ExtractionResult::failure(
            request,
            info.size,
            format!(
                "object too small to be a valid PDF ({} bytes, minimum {})",
                info.size, params.min_object_bytes
            ),
        )));
    }

    match store.get(bucket, key).await {
        Ok(bytes) => Ok(Fetched::Document(bytes)),
        Err(e) if e.is_input_error() => Ok(Fetched::Rejected(rejected(request, &e))),
        Err(e) => Err(e),
    }
}

fn rejected(request: &ExtractionRequest, err: &StoreError) -> ExtractionResult {
    tracing::warn!(error = %err, "source object unavailable");
    ExtractionResult::failure(request, 0, err.to_string())
}
