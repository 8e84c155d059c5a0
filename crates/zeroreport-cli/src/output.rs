use std::io::Write;

use owo_colors::OwoColorize;
use serde::Serialize;

use zeroreport_core::{ExtractionResult, Status};

use crate::job::JobOutcome;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

#[derive(Serialize)]
struct Outputs {
    metadata_json: String,
}

/// The one-line run summary printed to stdout.
#[derive(Serialize)]
struct Summary<'a> {
    status: Status,
    doc_id: &'a str,
    ingest_date: String,
    bucket: &'a str,
    key: &'a str,
    size_bytes: u64,
    pages: u32,
    text_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    outputs: Outputs,
}

pub fn summary_line(outcome: &JobOutcome) -> serde_json::Result<String> {
    let r = &outcome.result;
    serde_json::to_string(&Summary {
        status: r.status,
        doc_id: &r.doc_id,
        ingest_date: outcome.ingest_date.format("%Y-%m-%d").to_string(),
        bucket: &r.bucket,
        key: &r.key,
        size_bytes: r.size_bytes,
        pages: r.pages,
        text_found: outcome.text_found,
        error: r.error.as_deref(),
        outputs: Outputs {
            metadata_json: outcome.output.to_string(),
        },
    })
}

/// Print a record for `inspect`: a status line, then the JSON body.
pub fn print_record(
    w: &mut dyn Write,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let headline = match result.status {
        Status::Ok => format!(
            "OK  {} pages, hebrew_detected={}",
            result.pages,
            result.hebrew_detected()
        ),
        Status::Error => format!(
            "ERROR  {}",
            result.error.as_deref().unwrap_or("unknown error")
        ),
    };
    if color.enabled() {
        match result.status {
            Status::Ok => writeln!(w, "{}", headline.green())?,
            Status::Error => writeln!(w, "{}", headline.red())?,
        }
    } else {
        writeln!(w, "{}", headline)?;
    }

    let json = serde_json::to_string_pretty(result).map_err(std::io::Error::other)?;
    writeln!(w, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use zeroreport_core::ExtractionRequest;
    use zeroreport_store::ObjectUri;

    use super::*;

    fn error_outcome() -> JobOutcome {
        let request = ExtractionRequest::new("reports", "raw/a.pdf", "staging");
        JobOutcome {
            result: ExtractionResult::failure(&request, 0, "object not found"),
            text_found: false,
            ingest_date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            output: ObjectUri::new("out", "staging/ingest_date=2024-03-07/doc_id=x/metadata.json"),
        }
    }

    #[test]
    fn summary_fields() {
        let line = summary_line(&error_outcome()).unwrap();
        assert!(!line.contains('\n'));
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["status"], "ERROR");
        assert_eq!(v["ingest_date"], "2024-03-07");
        assert_eq!(v["bucket"], "reports");
        assert_eq!(v["error"], "object not found");
        assert_eq!(v["text_found"], false);
        assert_eq!(
            v["outputs"]["metadata_json"],
            "s3://out/staging/ingest_date=2024-03-07/doc_id=x/metadata.json"
        );
    }

    #[test]
    fn plain_record_output() {
        let mut buf = Vec::new();
        print_record(&mut buf, &error_outcome().result, ColorMode(false)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("ERROR  object not found\n"));
        assert!(text.contains("\"status\": \"ERROR\""));
    }
}
