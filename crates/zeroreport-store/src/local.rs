use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::{ObjectInfo, ObjectStore, StoreError, StoreFuture};

/// Filesystem-backed store: `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a bucket/key pair, refusing anything that would escape `root`.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
            return Err(StoreError::InvalidKey(format!("bad bucket name {:?}", bucket)));
        }
        let key_path = Path::new(key);
        let clean = !key.is_empty()
            && key_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(StoreError::InvalidKey(format!("bad key {:?}", key)));
        }
        Ok(self.root.join(bucket).join(key_path))
    }

    fn map_io(err: std::io::Error, bucket: &str, key: &str) -> StoreError {
        match err.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: err.to_string(),
            },
            _ => StoreError::Io(err),
        }
    }
}

/// `<len>-<mtime nanos>` in hex, the usual static-file-server tag. `None`
/// when the platform reports no modification time.
fn metadata_etag(meta: &Metadata) -> Option<String> {
    let modified = meta.modified().ok()?.duration_since(UNIX_EPOCH).ok()?;
    Some(format!("{:x}-{:x}", meta.len(), modified.as_nanos()))
}

impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    fn head<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, ObjectInfo> {
        Box::pin(async move {
            let path = self.object_path(bucket, key)?;
            let meta = tokio::fs::metadata(&path)
                .await
                .map_err(|e| Self::map_io(e, bucket, key))?;
            if !meta.is_file() {
                return Err(StoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
            }
            Ok(ObjectInfo {
                size: meta.len(),
                etag: metadata_etag(&meta),
            })
        })
    }

    fn get<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let path = self.object_path(bucket, key)?;
            tracing::debug!(path = %path.display(), "reading object");
            tokio::fs::read(&path)
                .await
                .map_err(|e| Self::map_io(e, bucket, key))
        })
    }

    fn put<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
        _content_type: &'a str,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let path = self.object_path(bucket, key)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Self::map_io(e, bucket, key))?;
            }
            tracing::debug!(path = %path.display(), bytes = body.len(), "writing object");
            tokio::fs::write(&path, body)
                .await
                .map_err(|e| Self::map_io(e, bucket, key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_joins_bucket_and_key() {
        let store = LocalObjectStore::new("/srv/objects");
        assert_eq!(
            store.object_path("reports", "raw/a.pdf").unwrap(),
            PathBuf::from("/srv/objects/reports/raw/a.pdf")
        );
    }

    #[test]
    fn object_path_rejects_escapes() {
        let store = LocalObjectStore::new("/srv/objects");
        for key in ["../etc/passwd", "/abs.pdf", "raw/../../x", "", "./a.pdf"] {
            assert!(
                matches!(store.object_path("b", key), Err(StoreError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
        assert!(store.object_path("..", "a.pdf").is_err());
    }

    #[test]
    fn etag_tracks_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"abc").unwrap();
        let short = metadata_etag(&std::fs::metadata(&path).unwrap()).unwrap();
        std::fs::write(&path, b"abcdef").unwrap();
        let long = metadata_etag(&std::fs::metadata(&path).unwrap()).unwrap();
        assert!(short.starts_with("3-"));
        assert!(long.starts_with("6-"));
    }
}
