use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub storage: Option<StorageConfig>,
    pub job: Option<JobConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of an S3-compatible endpoint (path-style addressing).
    pub endpoint: Option<String>,
    /// Directory used as the object store root instead of an endpoint.
    pub local_root: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub staging_prefix: Option<String>,
    pub out_bucket: Option<String>,
    /// Objects smaller than this are rejected before download. `0` disables.
    pub min_object_bytes: Option<u64>,
    pub max_text_pages: Option<usize>,
    /// Treat an OK record whose leading pages have no text as a job failure.
    pub require_text: Option<bool>,
    /// Treat an OK record without Hebrew text as a job failure.
    pub require_hebrew: Option<bool>,
}

/// Platform config directory path: `<config_dir>/zeroreport/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("zeroreport").join("config.toml"))
}

/// Load config by cascading CWD `.zeroreport.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".zeroreport.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bs = base.storage.unwrap_or_default();
    let os = overlay.storage.unwrap_or_default();
    let bj = base.job.unwrap_or_default();
    let oj = overlay.job.unwrap_or_default();

    ConfigFile {
        storage: Some(StorageConfig {
            endpoint: os.endpoint.or(bs.endpoint),
            local_root: os.local_root.or(bs.local_root),
            timeout_secs: os.timeout_secs.or(bs.timeout_secs),
        }),
        job: Some(JobConfig {
            staging_prefix: oj.staging_prefix.or(bj.staging_prefix),
            out_bucket: oj.out_bucket.or(bj.out_bucket),
            min_object_bytes: oj.min_object_bytes.or(bj.min_object_bytes),
            max_text_pages: oj.max_text_pages.or(bj.max_text_pages),
            require_text: oj.require_text.or(bj.require_text),
            require_hebrew: oj.require_hebrew.or(bj.require_hebrew),
        }),
    }
}
