//! Partitioned output layout:
//! `<prefix>/ingest_date=YYYY-MM-DD/doc_id=<doc_id>/metadata.json`.

use chrono::{NaiveDate, Utc};

pub const METADATA_FILE: &str = "metadata.json";
pub const DEFAULT_STAGING_PREFIX: &str = "staging";

/// Object key for a record. Slashes around `prefix` are normalized away.
pub fn staging_key(prefix: &str, ingest_date: NaiveDate, doc_id: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let partition = format!(
        "ingest_date={}/doc_id={}/{}",
        ingest_date.format("%Y-%m-%d"),
        doc_id,
        METADATA_FILE
    );
    if prefix.is_empty() {
        partition
    } else {
        format!("{}/{}", prefix, partition)
    }
}

/// The invocation's ingest date (UTC).
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
