use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::doc_id::doc_id;
use crate::metadata::MetadataValue;

/// Validation key for the Hebrew-script check.
pub const HEBREW_DETECTED: &str = "hebrew_detected";

/// Where a document comes from and where its record should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub source_bucket: String,
    pub source_key: String,
    pub staging_prefix: String,
}

impl ExtractionRequest {
    pub fn new(
        source_bucket: impl Into<String>,
        source_key: impl Into<String>,
        staging_prefix: impl Into<String>,
    ) -> Self {
        Self {
            source_bucket: source_bucket.into(),
            source_key: source_key.into(),
            staging_prefix: staging_prefix.into(),
        }
    }

    pub fn doc_id(&self) -> String {
        doc_id(&self.source_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

/// The record persisted for every invocation, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub status: Status,
    pub doc_id: String,
    pub bucket: String,
    pub key: String,
    pub size_bytes: u64,
    pub pages: u32,
    pub validations: BTreeMap<String, bool>,
    pub metadata: BTreeMap<String, MetadataValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Build an ERROR record. `pages` is zero and both maps are empty.
    pub fn failure(request: &ExtractionRequest, size_bytes: u64, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown extraction failure".to_string();
        }
        Self {
            status: Status::Error,
            doc_id: request.doc_id(),
            bucket: request.source_bucket.clone(),
            key: request.source_key.clone(),
            size_bytes,
            pages: 0,
            validations: BTreeMap::new(),
            metadata: BTreeMap::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// `false` for ERROR records, which carry no validations.
    pub fn hebrew_detected(&self) -> bool {
        self.validations
            .get(HEBREW_DETECTED)
            .copied()
            .unwrap_or(false)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ExtractionRequest {
        ExtractionRequest::new("reports", "raw/example.pdf", "staging")
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Status::Ok).unwrap(), "\"OK\"");
        assert_eq!(serde_json::to_string(&Status::Error).unwrap(), "\"ERROR\"");
    }

    #[test]
    fn failure_record_shape() {
        let r = ExtractionResult::failure(&request(), 12, "boom");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "ERROR");
        assert_eq!(v["error"], "boom");
        assert_eq!(v["pages"], 0);
        assert_eq!(v["size_bytes"], 12);
        assert_eq!(v["bucket"], "reports");
        assert_eq!(v["key"], "raw/example.pdf");
        assert!(!r.hebrew_detected());
    }

    #[test]
    fn failure_never_has_blank_error() {
        let r = ExtractionResult::failure(&request(), 0, "  ");
        assert!(!r.error.unwrap().trim().is_empty());
    }

    #[test]
    fn ok_record_omits_error_field() {
        let mut r = ExtractionResult::failure(&request(), 3, "x");
        r.status = Status::Ok;
        r.error = None;
        let v = serde_json::to_value(&r).unwrap();
        assert!(v.get("error").is_none());
    }

    #[test]
    fn round_trip_is_field_for_field_equal() {
        let mut metadata = BTreeMap::new();
        metadata.insert("Title".to_string(), MetadataValue::from_raw("דוח אפס"));
        metadata.insert(
            "CreationDate".to_string(),
            MetadataValue::from_raw("D:20240131120000+02'00'"),
        );
        let mut validations = BTreeMap::new();
        validations.insert(HEBREW_DETECTED.to_string(), true);
        let r = ExtractionResult {
            status: Status::Ok,
            doc_id: request().doc_id(),
            bucket: "reports".into(),
            key: "raw/example.pdf".into(),
            size_bytes: 40_213,
            pages: 7,
            validations,
            metadata,
            error: None,
        };
        let json = r.to_json_pretty().unwrap();
        let back: ExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn date_shaped_text_round_trips() {
        let mut r = ExtractionResult::failure(&request(), 3, "x");
        r.status = Status::Ok;
        r.error = None;
        r.metadata
            .insert("Subject".to_string(), MetadataValue::from("D:2024"));
        r.metadata
            .insert("Keywords".to_string(), MetadataValue::from("D:draft"));
        let back: ExtractionResult =
            serde_json::from_str(&r.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, r);
        assert!(back.metadata["Subject"].is_timestamp());
        assert!(!back.metadata["Keywords"].is_timestamp());
    }
}
