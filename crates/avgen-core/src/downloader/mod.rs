//! Parallel chunked downloader.
//!
//! Probes the URL with HEAD. A known, non-zero `Content-Length` is split into
//! ranged GETs run by a bounded worker pool, each writing its own chunk file
//! under a scratch directory next to the output. The chunks are appended in
//! index order to a staging file in that directory. An unknown size (no
//! length, zero, or a non-2xx HEAD) falls back to one streamed GET into the
//! same staging file. The staging file replaces the output only once the
//! download has fully succeeded.

mod chunk;
mod error;
mod pool;
mod single;
mod temp;

use std::fs;
use std::path::{Path, PathBuf};

pub use error::{ChunkError, DownloadError};

use crate::fetch_head;
use crate::plan::DownloadPlan;
use temp::ChunkDir;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_CHUNK_READ_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Upper bound on concurrent chunk requests (and on the chunk count).
    pub workers: usize,
    /// Buffer size for socket reads and file writes.
    pub chunk_read_size: usize,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            chunk_read_size: DEFAULT_CHUNK_READ_SIZE,
        }
    }
}

/// What one [`ParallelDownloader::download`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub path: PathBuf,
    pub bytes: u64,
    /// Number of ranged chunks; 0 for a sequential download.
    pub chunks: usize,
}

impl DownloadReport {
    pub fn is_sequential(&self) -> bool {
        self.chunks == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParallelDownloader {
    options: DownloadOptions,
}

impl ParallelDownloader {
    pub fn new(options: DownloadOptions) -> Self {
        Self {
            options: DownloadOptions {
                workers: options.workers.max(1),
                chunk_read_size: options.chunk_read_size.max(1),
            },
        }
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Downloads `url` to `output`, creating missing parent directories.
    ///
    /// Bytes land in a scratch directory next to `output` and are renamed over
    /// it only once the download is complete. On any error an existing file at
    /// `output` is left as it was.
    pub fn download(&self, url: &str, output: &Path) -> Result<DownloadReport, DownloadError> {
        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(DownloadError::io("create dir", parent))?;

        let head = fetch_head::probe(url).map_err(|source| DownloadError::Probe {
            url: url.to_string(),
            source,
        })?;
        if !head.is_success() {
            tracing::warn!("HEAD {} returned HTTP {}; size unknown", url, head.status);
        }

        let plan = DownloadPlan::new(head.known_size().unwrap_or(0), self.options.workers);
        let dir = ChunkDir::create(parent)?;

        if plan.is_sequential() {
            tracing::info!("downloading {} sequentially", url);
            let bytes = single::download_single(url, &dir.staging_path(), &self.options)?;
            dir.commit(output)?;
            tracing::info!("saved {} ({} bytes)", output.display(), bytes);
            return Ok(DownloadReport {
                path: output.to_path_buf(),
                bytes,
                chunks: 0,
            });
        }

        if !head.accept_ranges {
            tracing::debug!("{} did not advertise byte ranges; trying anyway", url);
        }
        tracing::info!(
            "downloading {} ({} bytes) in {} chunks",
            url,
            plan.total_size,
            plan.num_chunks()
        );

        pool::run_chunks(url, &plan, &dir, &self.options)?;
        let bytes = dir.concatenate(plan.num_chunks(), self.options.chunk_read_size)?;
        if bytes != plan.total_size {
            return Err(DownloadError::SizeMismatch {
                url: url.to_string(),
                expected: plan.total_size,
                actual: bytes,
            });
        }
        dir.commit(output)?;

        tracing::info!("saved {} ({} bytes)", output.display(), bytes);
        Ok(DownloadReport {
            path: output.to_path_buf(),
            bytes,
            chunks: plan.num_chunks(),
        })
    }
}
