use std::fmt;
use std::str::FromStr;

use crate::StoreError;

/// An `s3://bucket/key` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUri {
    pub bucket: String,
    pub key: String,
}

impl ObjectUri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl FromStr for ObjectUri {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("s3://")
            .ok_or_else(|| StoreError::InvalidKey(format!("expected s3://bucket/key, got {:?}", s)))?;
        match rest.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
                Ok(ObjectUri::new(bucket, key))
            }
            _ => Err(StoreError::InvalidKey(format!(
                "expected s3://bucket/key, got {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bucket_and_nested_key() {
        let uri: ObjectUri = "s3://reports/raw/2024/example.pdf".parse().unwrap();
        assert_eq!(uri.bucket, "reports");
        assert_eq!(uri.key, "raw/2024/example.pdf");
        assert_eq!(uri.to_string(), "s3://reports/raw/2024/example.pdf");
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["reports/raw.pdf", "s3://reports", "s3://reports/", "s3:///raw.pdf"] {
            assert!(bad.parse::<ObjectUri>().is_err(), "{bad:?}");
        }
    }
}
