//! Top-level error for end-to-end jobs.

use std::path::PathBuf;

use crate::downloader::DownloadError;
use crate::language::LanguageError;
use crate::poller::JobError;

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("missing credentials: set app_key and app_secret (config, flags or AVGEN_APP_KEY / AVGEN_APP_SECRET)")]
    MissingCredentials,

    #[error(transparent)]
    Validation(#[from] LanguageError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error("task_id {job_id}: downloading {url} failed: {source}")]
    Download {
        job_id: String,
        url: String,
        #[source]
        source: DownloadError,
    },

    #[error("creating output dir {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
