//! Scratch directory holding chunk files until they are assembled.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::DownloadError;

const TEMP_PREFIX: &str = ".download_temp_";
const MAX_NAME_ATTEMPTS: u32 = 1000;
const STAGING_NAME: &str = "output.part";

/// `.download_temp_{epochSeconds}` next to the output file.
///
/// Removed on drop, both after [`ChunkDir::commit`] and when the download
/// fails part way.
#[derive(Debug)]
pub(super) struct ChunkDir {
    path: PathBuf,
}

impl ChunkDir {
    /// Creates a fresh directory under `parent`. Two downloads started in the
    /// same second get `_1`, `_2`, ... suffixes instead of sharing one.
    pub(super) fn create(parent: &Path) -> Result<Self, DownloadError> {
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let base = format!("{}{}", TEMP_PREFIX, epoch);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, attempt)
            };
            let path = parent.join(name);
            match fs::create_dir(&path) {
                Ok(()) => {
                    tracing::debug!("chunk dir {}", path.display());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(DownloadError::io("create dir", path)(e)),
            }
        }

        Err(DownloadError::Io {
            context: "create dir",
            path: parent.join(base),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "no free temp dir name"),
        })
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn chunk_path(&self, index: usize) -> PathBuf {
        self.path.join(format!("chunk_{}", index))
    }

    /// File the finished download is assembled in before it replaces the output.
    pub(super) fn staging_path(&self) -> PathBuf {
        self.path.join(STAGING_NAME)
    }

    /// Appends `chunk_0 .. chunk_{count-1}` to the staging file in index order.
    /// Returns the number of bytes written.
    pub(super) fn concatenate(&self, count: usize, buffer_size: usize) -> Result<u64, DownloadError> {
        let staging = self.staging_path();
        let file = File::create(&staging).map_err(DownloadError::io("create", &staging))?;
        let mut writer = BufWriter::with_capacity(buffer_size, file);
        let mut total = 0u64;

        for index in 0..count {
            let chunk = self.chunk_path(index);
            let file = File::open(&chunk).map_err(DownloadError::io("open", &chunk))?;
            let mut reader = BufReader::with_capacity(buffer_size, file);
            total += io::copy(&mut reader, &mut writer)
                .map_err(DownloadError::io("append", &staging))?;
        }

        writer.flush().map_err(DownloadError::io("write", &staging))?;
        Ok(total)
    }

    /// Moves the staging file over `output`; the directory goes with `self`.
    /// `output` is untouched unless the rename succeeds.
    pub(super) fn commit(self, output: &Path) -> Result<(), DownloadError> {
        fs::rename(self.staging_path(), output).map_err(DownloadError::io("rename into", output))
    }
}

impl Drop for ChunkDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!("removed {}", self.path.display()),
            Err(e) => tracing::warn!("could not remove {}: {}", self.path.display(), e),
        }
    }
}
