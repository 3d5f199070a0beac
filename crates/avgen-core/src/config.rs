use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::downloader::{DownloadOptions, DEFAULT_CHUNK_READ_SIZE, DEFAULT_WORKERS};
use crate::endpoints::{ServiceTable, REGION_MAINLAND};
use crate::poller::PollPolicy;

/// Result polling (optional `[poll]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between result queries.
    pub interval_secs: f64,
    /// Give up after this many seconds of polling (None = wait forever).
    pub deadline_secs: Option<u64>,
    /// Give up after this many consecutive failed polls (None = never).
    pub max_transient_errors: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10.0,
            deadline_secs: None,
            max_transient_errors: None,
        }
    }
}

/// Artifact downloads (optional `[download]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Concurrent ranged requests per file.
    pub workers: usize,
    /// Read/write buffer size in bytes.
    pub chunk_read_bytes: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            chunk_read_bytes: DEFAULT_CHUNK_READ_SIZE,
        }
    }
}

/// Global configuration loaded from `~/.config/avgen/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvgenConfig {
    /// Application key issued by the vendor. CLI flag / env var wins over this.
    pub app_key: Option<String>,
    /// Application secret issued by the vendor.
    pub app_secret: Option<String>,
    /// Endpoint region: "mainland" or "global".
    pub region: String,
    /// Connect + total timeout for one API call, in seconds.
    pub request_timeout_secs: u64,
    /// Where artifacts are written when the caller does not say.
    pub output_dir: PathBuf,
    pub poll: PollConfig,
    pub download: DownloadConfig,
    /// Per-region service URL overrides: `[endpoints.mainland]` with
    /// `"avatar.image_to_video" = "https://..."`.
    pub endpoints: HashMap<String, HashMap<String, String>>,
}

impl Default for AvgenConfig {
    fn default() -> Self {
        Self {
            app_key: None,
            app_secret: None,
            region: REGION_MAINLAND.to_string(),
            request_timeout_secs: 20,
            output_dir: PathBuf::from("."),
            poll: PollConfig::default(),
            download: DownloadConfig::default(),
            endpoints: HashMap::new(),
        }
    }
}

impl AvgenConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Rejects values that cannot become a [`PollPolicy`].
    pub fn validate(&self) -> Result<()> {
        let secs = self.poll.interval_secs;
        if !secs.is_finite() || secs < 0.0 {
            bail!("poll.interval_secs must be a non-negative number, got {}", secs);
        }
        if Duration::try_from_secs_f64(secs).is_err() {
            bail!("poll.interval_secs {} is too large", secs);
        }
        Ok(())
    }

    /// Negative or NaN intervals are treated as zero; oversized ones saturate.
    pub fn poll_policy(&self) -> PollPolicy {
        let secs = self.poll.interval_secs;
        let interval = if secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        PollPolicy {
            interval,
            deadline: self.poll.deadline_secs.map(Duration::from_secs),
            max_transient_errors: self.poll.max_transient_errors,
        }
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            workers: self.download.workers,
            chunk_read_size: self.download.chunk_read_bytes,
        }
    }

    /// Built-in endpoints with this config's overrides applied.
    pub fn service_table(&self) -> ServiceTable {
        self.endpoints
            .iter()
            .fold(ServiceTable::builtin(), |table, (region, services)| {
                table.with_overrides(region, services)
            })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("avgen")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AvgenConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AvgenConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<AvgenConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let cfg: AvgenConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}
