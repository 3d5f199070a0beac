//! Download error types.

use std::io;
use std::path::PathBuf;

/// Error returned by a single chunk worker.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[source] curl::Error),
    /// HTTP response was not 206 (or 200 for a whole-file range).
    #[error("HTTP {0}")]
    Http(u32),
    /// Server sent more bytes than the range asked for (Range ignored).
    #[error("server sent more than the {expected} requested bytes")]
    Overrun { expected: u64 },
    /// Transfer completed with fewer bytes than the range length.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Writing the chunk file failed.
    #[error("storage: {0}")]
    Storage(#[source] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("HEAD {url} failed: {source}")]
    Probe {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("GET {url} failed: {source}")]
    Transfer {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    #[error("chunk {index} of {url} failed: {source}")]
    Chunk {
        url: String,
        index: usize,
        #[source]
        source: ChunkError,
    },

    #[error("assembled {actual} bytes for {url}, expected {expected}")]
    SizeMismatch {
        url: String,
        expected: u64,
        actual: u64,
    },

    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| DownloadError::Io {
            context,
            path,
            source,
        }
    }
}
