//! Bounded worker pool over the planned chunks.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use super::chunk;
use super::error::DownloadError;
use super::temp::ChunkDir;
use super::DownloadOptions;
use crate::plan::DownloadPlan;

/// Runs every chunk of `plan` with at most `options.workers` threads and
/// waits for all of them. Workers pull the next index from a shared cursor;
/// after the first failure no new chunk is started. The first error is
/// returned once every worker has exited.
pub(super) fn run_chunks(
    url: &str,
    plan: &DownloadPlan,
    dir: &ChunkDir,
    options: &DownloadOptions,
) -> Result<(), DownloadError> {
    let count = plan.num_chunks();
    if count == 0 {
        return Ok(());
    }
    let next = AtomicUsize::new(0);
    let abort = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel();
    let num_workers = options.workers.max(1).min(count);

    thread::scope(|scope| {
        for _ in 0..num_workers {
            let tx = tx.clone();
            let next = &next;
            let abort = &abort;
            scope.spawn(move || loop {
                if abort.load(Ordering::Relaxed) {
                    break;
                }
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(range) = plan.chunks.get(index) else {
                    break;
                };
                let whole_file = range.start == 0 && range.end == plan.total_size;
                let result =
                    chunk::download_chunk(url, range, whole_file, &dir.chunk_path(index), options);
                if result.is_err() {
                    abort.store(true, Ordering::Relaxed);
                }
                if tx.send((index, result)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut first_error = None;
        let mut done = 0usize;
        for (index, result) in rx {
            match result {
                Ok(bytes) => {
                    done += 1;
                    tracing::debug!("chunk {} done ({} bytes, {}/{})", index, bytes, done, count);
                }
                Err(source) => {
                    tracing::warn!("chunk {} failed: {}", index, source);
                    if first_error.is_none() {
                        first_error = Some(DownloadError::Chunk {
                            url: url.to_string(),
                            index,
                            source,
                        });
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
}
