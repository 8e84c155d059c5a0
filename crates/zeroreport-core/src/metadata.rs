//! Passthrough values for embedded document metadata.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `D:YYYY` optionally followed by MM, DD, HH, mm, SS and a zone suffix.
static PDF_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^D:\d{4}(\d{2}){0,5}([Zz+\-].*)?$").unwrap());

/// A single embedded metadata value.
///
/// Text and timestamps serialize as plain JSON strings. Timestamps keep
/// their PDF encoding (`D:20240131120000+02'00'`) untouched. The tag is
/// always derived from the value, so a value survives a JSON round trip
/// with the same tag.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataValue(Tagged);

#[derive(Debug, Clone, PartialEq)]
enum Tagged {
    Text(String),
    Timestamp(String),
    /// Never holds a `Value::String`.
    Other(serde_json::Value),
}

impl MetadataValue {
    /// Tag a raw string read from the document.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if is_pdf_date(&raw) {
            MetadataValue(Tagged::Timestamp(raw))
        } else {
            MetadataValue(Tagged::Text(raw))
        }
    }

    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::from_raw(s),
            other => MetadataValue(Tagged::Other(other)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.0 {
            Tagged::Text(s) | Tagged::Timestamp(s) => Some(s),
            Tagged::Other(_) => None,
        }
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self.0, Tagged::Timestamp(_))
    }
}

pub fn is_pdf_date(s: &str) -> bool {
    PDF_DATE_RE.is_match(s)
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Tagged::Text(s) | Tagged::Timestamp(s) => serializer.serialize_str(s),
            Tagged::Other(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MetadataValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(value))
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::from_raw(s)
    }
}
