//! One ranged GET written to its own chunk file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use super::error::ChunkError;
use super::DownloadOptions;
use crate::plan::ChunkRange;

/// Fetches `range` of `url` into `path`. Returns the number of bytes written.
///
/// The response must be 206, or 200 when the range covers the whole file.
/// A server that ignores `Range` and streams more than `range.len()` bytes is
/// cut off as soon as it overruns.
pub(super) fn download_chunk(
    url: &str,
    range: &ChunkRange,
    whole_file: bool,
    path: &Path,
    options: &DownloadOptions,
) -> Result<u64, ChunkError> {
    let file = File::create(path).map_err(ChunkError::Storage)?;
    let mut writer = BufWriter::with_capacity(options.chunk_read_size, file);
    let expected = range.len();
    let mut received: u64 = 0;
    let mut overrun = false;
    let mut storage_error: Option<io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(ChunkError::Curl)?;
    easy.follow_location(true).map_err(ChunkError::Curl)?;
    easy.max_redirections(10).map_err(ChunkError::Curl)?;
    easy.buffer_size(options.chunk_read_size)
        .map_err(ChunkError::Curl)?;
    easy.connect_timeout(Duration::from_secs(30))
        .map_err(ChunkError::Curl)?;
    // Abort if throughput stays under 1 KiB/s for 60s.
    easy.low_speed_limit(1024).map_err(ChunkError::Curl)?;
    easy.low_speed_time(Duration::from_secs(60))
        .map_err(ChunkError::Curl)?;
    easy.timeout(Duration::from_secs(3600))
        .map_err(ChunkError::Curl)?;
    easy.range(&range.curl_range()).map_err(ChunkError::Curl)?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if received + data.len() as u64 > expected {
                    overrun = true;
                    return Ok(0);
                }
                match writer.write_all(data) {
                    Ok(()) => {
                        received += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        storage_error = Some(e);
                        Ok(0)
                    }
                }
            })
            .map_err(ChunkError::Curl)?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if e.is_write_error() {
            if overrun {
                return Err(ChunkError::Overrun { expected });
            }
            if let Some(io_err) = storage_error.take() {
                return Err(ChunkError::Storage(io_err));
            }
        }
        return Err(ChunkError::Curl(e));
    }

    let code = easy.response_code().map_err(ChunkError::Curl)?;
    let accepted = code == 206 || (code == 200 && whole_file);
    if !accepted {
        return Err(ChunkError::Http(code));
    }

    writer.flush().map_err(ChunkError::Storage)?;

    if received != expected {
        return Err(ChunkError::PartialTransfer { expected, received });
    }

    Ok(received)
}
