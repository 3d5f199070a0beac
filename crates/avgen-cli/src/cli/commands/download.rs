//! Download command: fetch one URL with the parallel downloader.

use anyhow::{Context, Result};
use avgen_core::config::AvgenConfig;
use avgen_core::downloader::ParallelDownloader;
use std::path::PathBuf;

pub async fn run_download(
    cfg: AvgenConfig,
    url: String,
    output: PathBuf,
    workers: Option<usize>,
) -> Result<()> {
    let mut options = cfg.download_options();
    if let Some(n) = workers {
        options.workers = n;
    }
    let downloader = ParallelDownloader::new(options);

    let report = tokio::task::spawn_blocking(move || downloader.download(&url, &output))
        .await
        .context("download task panicked")??;

    println!(
        "{}  {} bytes ({})",
        report.path.display(),
        report.bytes,
        if report.is_sequential() {
            "single stream".to_string()
        } else {
            format!("{} chunks", report.chunks)
        }
    );
    Ok(())
}
