//! Path-style S3 REST access over raw reqwest.
//!
//! Requests are unsigned. This fits public buckets, anonymous MinIO
//! policies, and endpoints fronted by a signing proxy.

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG};

use crate::{ObjectInfo, ObjectStore, StoreError, StoreFuture};

pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpObjectStore {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `<endpoint>/<bucket>/<key>` with each key segment percent-encoded.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<String, StoreError> {
        if bucket.is_empty() || bucket.contains('/') {
            return Err(StoreError::InvalidKey(format!("bad bucket name {:?}", bucket)));
        }
        if key.is_empty() || key.starts_with('/') {
            return Err(StoreError::InvalidKey(format!("bad key {:?}", key)));
        }
        Ok(format!(
            "{}/{}/{}",
            self.endpoint,
            urlencoding::encode(bucket),
            encode_key(key)
        ))
    }
}

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Map a non-success response to a [`StoreError`].
fn classify(status: StatusCode, body: &str, bucket: &str, key: &str) -> StoreError {
    let detail = parse_s3_error(body);
    let message = match &detail {
        Some(e) if !e.message.is_empty() => format!("{}: {}", e.code, e.message),
        Some(e) => e.code.clone(),
        None => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    };

    let no_such_key = detail
        .as_ref()
        .map(|e| e.code == "NoSuchKey" || e.code == "NoSuchBucket")
        .unwrap_or(false);

    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ if no_such_key => StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::PermissionDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        },
        _ => StoreError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct S3ErrorBody {
    code: String,
    message: String,
}

/// Parse `<Error><Code>..</Code><Message>..</Message></Error>`.
fn parse_s3_error(xml: &str) -> Option<S3ErrorBody> {
    if xml.trim().is_empty() {
        return None;
    }
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut in_error = false;
    let mut field: Option<&'static str> = None;
    let mut code = String::new();
    let mut message = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"Error" => in_error = true,
                b"Code" if in_error => field = Some("code"),
                b"Message" if in_error => field = Some("message"),
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if let Some(f) = field
                    && let Ok(text) = e.unescape()
                {
                    match f {
                        "code" => code.push_str(&text),
                        _ => message.push_str(&text),
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"Code" | b"Message" => field = None,
                b"Error" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }

    if code.is_empty() {
        None
    } else {
        Some(S3ErrorBody { code, message })
    }
}

impl ObjectStore for HttpObjectStore {
    fn name(&self) -> &str {
        "http"
    }

    fn head<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, ObjectInfo> {
        Box::pin(async move {
            let url = self.object_url(bucket, key)?;
            tracing::debug!(%url, "HEAD object");
            let resp = self.client.head(&url).send().await?;
            if !resp.status().is_success() {
                return Err(classify(resp.status(), "", bucket, key));
            }

            let size = resp
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .ok_or_else(|| StoreError::Http {
                    status: resp.status().as_u16(),
                    message: "HEAD response without Content-Length".to_string(),
                })?;
            let etag = resp
                .headers()
                .get(ETAG)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim_matches('"').to_string());

            Ok(ObjectInfo { size, etag })
        })
    }

    fn get<'a>(&'a self, bucket: &'a str, key: &'a str) -> StoreFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let url = self.object_url(bucket, key)?;
            tracing::debug!(%url, "GET object");
            let resp = self.client.get(&url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(classify(status, &body, bucket, key));
            }
            let bytes = resp.bytes().await?;
            Ok(bytes.to_vec())
        })
    }

    fn put<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Vec<u8>,
        content_type: &'a str,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let url = self.object_url(bucket, key)?;
            tracing::debug!(%url, bytes = body.len(), "PUT object");
            let resp = self
                .client
                .put(&url)
                .header(CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(classify(status, &body, bucket, key));
            }
            Ok(())
        })
    }
}
