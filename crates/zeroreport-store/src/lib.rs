//! Object storage access for the ingest job.
//!
//! Two implementations of [`ObjectStore`]: [`HttpObjectStore`] talks
//! path-style S3 REST over raw reqwest (no AWS SDK), [`LocalObjectStore`]
//! maps buckets to directories. Neither retries.

mod http;
mod local;
mod uri;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use http::HttpObjectStore;
pub use local::LocalObjectStore;
pub use uri::ObjectUri;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },
    #[error("permission denied for {bucket}/{key}: {message}")]
    PermissionDenied {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// The object is absent. Callers treat this as bad input rather than a
    /// broken environment.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// The request itself is bad (missing object, malformed key). The job
    /// records these instead of aborting.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::InvalidKey(_)
        )
    }
}

/// Size and entity tag reported for an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub size: u64,
    /// Unquoted entity tag, when the store reports one.
    pub etag: Option<String>,
}

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// A bucket/key object store.
pub trait ObjectStore: Send + Sync {
    /// Short name used in logs (e.g. "http", "local").
    fn name(&self) -> &str;

    fn head<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, ObjectInfo>;

    fn get<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, Vec<u8>>;

    fn put<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
        content_type: &'a str,
    ) -> StoreFuture<'a, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors() {
        let missing = StoreError::NotFound {
            bucket: "b".into(),
            key: "k.pdf".into(),
        };
        assert!(missing.is_input_error());
        assert!(StoreError::InvalidKey("raw/../x.pdf".into()).is_input_error());

        let denied = StoreError::PermissionDenied {
            bucket: "b".into(),
            key: "k.pdf".into(),
            message: "AccessDenied".into(),
        };
        assert!(!denied.is_input_error());
        assert!(
            !StoreError::Http {
                status: 503,
                message: "Service Unavailable".into()
            }
            .is_input_error()
        );
    }
}
