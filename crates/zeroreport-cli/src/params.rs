//! Job parameter resolution: CLI flags > env vars > config file > defaults.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Command};

use zeroreport_core::config_file::ConfigFile;
use zeroreport_core::{DEFAULT_MAX_TEXT_PAGES, DEFAULT_STAGING_PREFIX, ExtractionRequest};
use zeroreport_store::ObjectUri;

/// Objects below this size are rejected before download.
pub const DEFAULT_MIN_OBJECT_BYTES: u64 = 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Source object as s3://bucket/key (alternative to --source-bucket/--source-key)
    #[arg(long, conflicts_with_all = ["source_bucket", "source_key"])]
    pub source: Option<String>,

    /// Bucket holding the source PDF
    #[arg(long, alias = "SOURCE_BUCKET")]
    pub source_bucket: Option<String>,

    /// Key of the source PDF
    #[arg(long, alias = "SOURCE_KEY")]
    pub source_key: Option<String>,

    /// Root prefix for staged records [default: staging]
    #[arg(long, alias = "STAGING_PREFIX")]
    pub staging_prefix: Option<String>,

    /// Bucket receiving the record [default: the source bucket]
    #[arg(long, alias = "OUT_BUCKET")]
    pub out_bucket: Option<String>,

    /// S3-compatible endpoint, path-style (e.g. http://localhost:9000)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Use a local directory as the object store (buckets are subdirectories)
    #[arg(long)]
    pub local_root: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Reject objects smaller than this many bytes (0 disables)
    #[arg(long)]
    pub min_object_bytes: Option<u64>,

    /// Pages scanned for the Hebrew text sample
    #[arg(long)]
    pub max_text_pages: Option<usize>,

    /// Exit non-zero when the leading pages carry no extractable text
    #[arg(long)]
    pub require_text: bool,

    /// Exit non-zero when no Hebrew text is detected
    #[arg(long)]
    pub require_hebrew: bool,
}

/// Fully resolved job parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParams {
    pub source_bucket: String,
    pub source_key: String,
    pub staging_prefix: String,
    pub out_bucket: String,
    pub min_object_bytes: u64,
    pub max_text_pages: usize,
    pub require_text: bool,
    pub require_hebrew: bool,
}

impl JobParams {
    pub fn request(&self) -> ExtractionRequest {
        ExtractionRequest::new(
            self.source_bucket.clone(),
            self.source_key.clone(),
            self.staging_prefix.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    Http { endpoint: String, timeout: Duration },
    Local { root: PathBuf },
}

/// Resolve parameters. `env` looks up environment variables.
pub fn resolve(
    args: RunArgs,
    config: &ConfigFile,
    env: &dyn Fn(&str) -> Option<String>,
) -> anyhow::Result<(JobParams, StorageTarget)> {
    let job = config.job.clone().unwrap_or_default();
    let storage = config.storage.clone().unwrap_or_default();

    let (flag_bucket, flag_key) = match args.source.as_deref() {
        Some(uri) => {
            let uri: ObjectUri = uri.parse().context("invalid --source")?;
            (Some(uri.bucket), Some(uri.key))
        }
        None => (args.source_bucket, args.source_key),
    };

    let source_bucket = flag_bucket
        .or_else(|| env("SOURCE_BUCKET"))
        .context("source bucket is required (--source-bucket or SOURCE_BUCKET)")?;
    let source_key = flag_key
        .or_else(|| env("SOURCE_KEY"))
        .context("source key is required (--source-key or SOURCE_KEY)")?;
    let staging_prefix = args
        .staging_prefix
        .or_else(|| env("STAGING_PREFIX"))
        .or(job.staging_prefix)
        .unwrap_or_else(|| DEFAULT_STAGING_PREFIX.to_string());
    let out_bucket = args
        .out_bucket
        .or_else(|| env("OUT_BUCKET"))
        .or(job.out_bucket)
        .unwrap_or_else(|| source_bucket.clone());
    let min_object_bytes = match args.min_object_bytes {
        Some(n) => Some(n),
        None => env("MIN_OBJECT_BYTES")
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid MIN_OBJECT_BYTES {:?}", v))
            })
            .transpose()?,
    }
    .or(job.min_object_bytes)
    .unwrap_or(DEFAULT_MIN_OBJECT_BYTES);
    let max_text_pages = args
        .max_text_pages
        .or(job.max_text_pages)
        .unwrap_or(DEFAULT_MAX_TEXT_PAGES);
    let require_text = args.require_text
        || env_flag(env, "REQUIRE_TEXT")?
        || job.require_text.unwrap_or(false);
    let require_hebrew = args.require_hebrew
        || env_flag(env, "REQUIRE_HEBREW")?
        || job.require_hebrew.unwrap_or(false);

    if source_bucket.is_empty() || source_key.is_empty() {
        bail!("source bucket and key must be non-empty");
    }

    let timeout = Duration::from_secs(
        args.timeout_secs
            .or(storage.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    );

    // The first level that names any store decides which kind is used.
    let target = if let Some(root) = args.local_root {
        StorageTarget::Local { root }
    } else if let Some(endpoint) = args.endpoint {
        StorageTarget::Http { endpoint, timeout }
    } else if let Some(root) = env("ZEROREPORT_LOCAL_ROOT") {
        StorageTarget::Local {
            root: PathBuf::from(root),
        }
    } else if let Some(endpoint) = env("ZEROREPORT_ENDPOINT").or_else(|| env("AWS_ENDPOINT_URL")) {
        StorageTarget::Http { endpoint, timeout }
    } else if let Some(root) = storage.local_root {
        StorageTarget::Local {
            root: PathBuf::from(root),
        }
    } else if let Some(endpoint) = storage.endpoint {
        StorageTarget::Http { endpoint, timeout }
    } else {
        bail!("no object store configured: pass --endpoint or --local-root");
    };

    Ok((
        JobParams {
            source_bucket,
            source_key,
            staging_prefix,
            out_bucket,
            min_object_bytes,
            max_text_pages,
            require_text,
            require_hebrew,
        },
        target,
    ))
}

/// Boolean environment switch. Unset or empty is `false`.
fn env_flag(env: &dyn Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<bool> {
    let Some(raw) = env(name) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("invalid {} {:?}: expected true or false", name, raw),
    }
}

/// Separate `argv` into what clap should parse and the unrecognized
/// `--flag [value]` pairs that schedulers such as AWS Glue append to a
/// `run` invocation (`--JOB_ID`, `--job-bookmark-option`, ...).
///
/// Only tokens after the `run` subcommand are filtered; other commands
/// pass through untouched.
pub fn split_unknown_run_flags<I, T>(cmd: &Command, argv: I) -> (Vec<OsString>, Vec<String>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let subcommand_at = argv
        .iter()
        .skip(1)
        .position(|a| !a.to_str().is_some_and(|s| s.starts_with('-')))
        .map(|i| i + 1);
    let (Some(run_at), Some(run)) = (subcommand_at, cmd.find_subcommand("run")) else {
        return (argv, Vec::new());
    };
    if argv[run_at].as_os_str() != "run" {
        return (argv, Vec::new());
    }

    // long name (or alias) -> whether it takes a value
    let mut known: HashMap<String, bool> = HashMap::new();
    known.insert("help".to_string(), false);
    for arg in cmd.get_arguments().chain(run.get_arguments()) {
        let takes_value = arg.get_action().takes_values();
        if let Some(long) = arg.get_long() {
            known.insert(long.to_string(), takes_value);
        }
        for alias in arg.get_all_aliases().unwrap_or_default() {
            known.insert(alias.to_string(), takes_value);
        }
    }

    let mut kept = argv[..=run_at].to_vec();
    let mut ignored = Vec::new();
    let mut rest = argv[run_at + 1..].iter().peekable();
    while let Some(token) = rest.next() {
        let Some(flag) = token.to_str().and_then(|s| s.strip_prefix("--")) else {
            kept.push(token.clone());
            continue;
        };
        if flag.is_empty() {
            kept.push(token.clone());
            kept.extend(rest.by_ref().cloned());
            break;
        }
        let (name, inline_value) = match flag.split_once('=') {
            Some((name, _)) => (name, true),
            None => (flag, false),
        };
        match known.get(name) {
            Some(&takes_value) => {
                kept.push(token.clone());
                if takes_value
                    && !inline_value
                    && let Some(value) = rest.next()
                {
                    kept.push(value.clone());
                }
            }
            None => {
                ignored.push(token.to_string_lossy().into_owned());
                if !inline_value
                    && let Some(value) =
                        rest.next_if(|v| !v.to_str().is_some_and(|s| s.starts_with('-')))
                {
                    ignored.push(value.to_string_lossy().into_owned());
                }
            }
        }
    }
    (kept, ignored)
}
