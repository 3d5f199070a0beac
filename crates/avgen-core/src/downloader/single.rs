//! Single-stream HTTP GET (no Range), used when the size is unknown.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use super::error::DownloadError;
use super::DownloadOptions;

/// Streams `url` into `output` with one GET. Returns the number of bytes written.
pub(super) fn download_single(
    url: &str,
    output: &Path,
    options: &DownloadOptions,
) -> Result<u64, DownloadError> {
    let transfer_err = |source: curl::Error| DownloadError::Transfer {
        url: url.to_string(),
        source,
    };

    let file = File::create(output).map_err(DownloadError::io("create", output))?;
    let mut writer = BufWriter::with_capacity(options.chunk_read_size, file);
    let mut written: u64 = 0;
    let mut storage_error: Option<io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transfer_err)?;
    easy.follow_location(true).map_err(transfer_err)?;
    easy.max_redirections(10).map_err(transfer_err)?;
    easy.buffer_size(options.chunk_read_size)
        .map_err(transfer_err)?;
    easy.connect_timeout(Duration::from_secs(30))
        .map_err(transfer_err)?;
    easy.low_speed_limit(1024).map_err(transfer_err)?;
    easy.low_speed_time(Duration::from_secs(60))
        .map_err(transfer_err)?;
    easy.timeout(Duration::from_secs(3600))
        .map_err(transfer_err)?;

    let perform_result = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| match writer.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("single download write failed: {}", e);
                    storage_error = Some(e);
                    Ok(0) // abort transfer
                }
            })
            .map_err(transfer_err)?;
        transfer.perform()
    };

    if let Err(e) = perform_result {
        if let Some(io_err) = storage_error.take() {
            return Err(DownloadError::Io {
                context: "write",
                path: output.to_path_buf(),
                source: io_err,
            });
        }
        return Err(transfer_err(e));
    }

    let status = easy.response_code().map_err(transfer_err)?;
    if !(200..300).contains(&status) {
        return Err(DownloadError::Http {
            url: url.to_string(),
            status,
        });
    }

    writer.flush().map_err(DownloadError::io("write", output))?;
    Ok(written)
}
