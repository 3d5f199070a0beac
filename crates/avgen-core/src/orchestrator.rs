//! Submit → poll → download, for any capability.
//!
//! [`JobOrchestrator`] runs one [`JobDescriptor`] end to end using the
//! capability's descriptor for result fields and file extensions.
//! [`AvatarClient`] is the facade built from configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{ApiClient, RequestSender};
use crate::capability::{Capability, JobDescriptor};
use crate::config::AvgenConfig;
use crate::downloader::ParallelDownloader;
use crate::error::AvatarError;
use crate::language::{Language, LanguageTable};
use crate::poller::{JobHandle, JobOutcome, JobPoller, Sleeper, ThreadSleeper};
use crate::signing::Credentials;

/// Speakers assumed in a translated video unless the caller says otherwise.
pub const DEFAULT_SPEAKER_NUM: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// The generated video.
    Primary,
    /// Voice-over cover image.
    Cover,
}

/// One downloaded file and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub remote_url: String,
}

/// Everything a finished job produced on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobArtifacts {
    pub capability: Capability,
    pub job_id: JobHandle,
    pub assets: Vec<Artifact>,
}

impl JobArtifacts {
    /// The generated video. Always present on a successful job.
    pub fn primary(&self) -> Option<&Artifact> {
        self.asset(AssetKind::Primary)
    }

    pub fn cover(&self) -> Option<&Artifact> {
        self.asset(AssetKind::Cover)
    }

    fn asset(&self, kind: AssetKind) -> Option<&Artifact> {
        self.assets.iter().find(|a| a.kind == kind)
    }
}

pub struct JobOrchestrator<S, Z = ThreadSleeper> {
    poller: JobPoller<S, Z>,
    downloader: ParallelDownloader,
}

impl<S: RequestSender, Z: Sleeper> JobOrchestrator<S, Z> {
    pub fn new(poller: JobPoller<S, Z>, downloader: ParallelDownloader) -> Self {
        Self { poller, downloader }
    }

    pub fn poller(&self) -> &JobPoller<S, Z> {
        &self.poller
    }

    pub fn downloader(&self) -> &ParallelDownloader {
        &self.downloader
    }

    /// Submits `job`, waits for it, and downloads its results into `output_dir`.
    pub fn run(&self, job: JobDescriptor, output_dir: &Path) -> Result<JobArtifacts, AvatarError> {
        let outcome = self.poller.submit_and_await(job.capability, job.payload)?;
        self.fetch_assets(&outcome, output_dir)
    }

    /// Downloads the assets of a finished job as `{job_id}.{ext}`.
    pub fn fetch_assets(
        &self,
        outcome: &JobOutcome,
        output_dir: &Path,
    ) -> Result<JobArtifacts, AvatarError> {
        fs::create_dir_all(output_dir).map_err(|source| AvatarError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let spec = outcome.capability.spec();

        let mut wanted = vec![(AssetKind::Primary, &outcome.result_url, spec.primary_ext)];
        if let Some(cover) = &outcome.secondary_url {
            wanted.push((AssetKind::Cover, cover, spec.secondary_ext));
        }

        let mut assets = Vec::with_capacity(wanted.len());
        for (kind, url, ext) in wanted {
            let path = output_dir.join(format!("{}.{}", outcome.job_id, ext));
            self.downloader
                .download(url, &path)
                .map_err(|source| AvatarError::Download {
                    job_id: outcome.job_id.to_string(),
                    url: url.clone(),
                    source,
                })?;
            tracing::info!(
                capability = %outcome.capability,
                task_id = %outcome.job_id,
                "saved {}",
                path.display()
            );
            assets.push(Artifact {
                kind,
                path,
                remote_url: url.clone(),
            });
        }

        Ok(JobArtifacts {
            capability: outcome.capability,
            job_id: outcome.job_id.clone(),
            assets,
        })
    }
}

/// End-to-end client: one method per capability.
pub struct AvatarClient<S = ApiClient, Z = ThreadSleeper> {
    orchestrator: JobOrchestrator<S, Z>,
    languages: &'static LanguageTable,
}

impl AvatarClient<ApiClient, ThreadSleeper> {
    /// Builds the signed client, poller and downloader from `config`.
    pub fn from_config(config: &AvgenConfig) -> Result<Self, AvatarError> {
        let (app_key, app_secret) = match (&config.app_key, &config.app_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => (key, secret),
            _ => return Err(AvatarError::MissingCredentials),
        };
        let client = ApiClient::new(
            Arc::new(Credentials::new(app_key.as_str(), app_secret.as_str())),
            Arc::new(config.service_table()),
            config.region.as_str(),
        )
        .with_timeout(config.request_timeout());
        let poller = JobPoller::new(client, config.poll_policy());
        let downloader = ParallelDownloader::new(config.download_options());
        Ok(Self::new(JobOrchestrator::new(poller, downloader)))
    }
}

impl<S: RequestSender, Z: Sleeper> AvatarClient<S, Z> {
    pub fn new(orchestrator: JobOrchestrator<S, Z>) -> Self {
        Self {
            orchestrator,
            languages: LanguageTable::builtin(),
        }
    }

    pub fn orchestrator(&self) -> &JobOrchestrator<S, Z> {
        &self.orchestrator
    }

    pub fn languages(&self) -> &LanguageTable {
        self.languages
    }

    /// Talking-head video from an image and an audio track; saved as `{job_id}.mp4`.
    pub fn image_to_video(
        &self,
        image_url: &str,
        audio_url: &str,
        output_dir: &Path,
    ) -> Result<JobArtifacts, AvatarError> {
        self.orchestrator
            .run(JobDescriptor::image_to_video(image_url, audio_url), output_dir)
    }

    /// Re-dubbed video as `{job_id}.mp4`, plus `{job_id}.jpg` when a cover is returned.
    pub fn voice_over(
        &self,
        video_url: &str,
        audio_url: &str,
        output_dir: &Path,
    ) -> Result<JobArtifacts, AvatarError> {
        self.orchestrator
            .run(JobDescriptor::voice_over(video_url, audio_url), output_dir)
    }

    /// Translated video. Languages are names or codes; both are checked
    /// before anything is sent.
    pub fn video_translate(
        &self,
        video_url: &str,
        source_language: &str,
        target_language: &str,
        output_dir: &Path,
    ) -> Result<JobArtifacts, AvatarError> {
        self.video_translate_with_speakers(
            video_url,
            source_language,
            target_language,
            DEFAULT_SPEAKER_NUM,
            output_dir,
        )
    }

    pub fn video_translate_with_speakers(
        &self,
        video_url: &str,
        source_language: &str,
        target_language: &str,
        speaker_num: u32,
        output_dir: &Path,
    ) -> Result<JobArtifacts, AvatarError> {
        let (source, target) = self.resolve_languages(source_language, target_language)?;
        let job = JobDescriptor::video_translate(video_url, source, target, speaker_num);
        self.orchestrator.run(job, output_dir)
    }

    fn resolve_languages(
        &self,
        source: &str,
        target: &str,
    ) -> Result<(&Language, &Language), AvatarError> {
        let pair = self.languages.resolve_pair(source, target)?;
        tracing::debug!(source = %pair.0.code, target = %pair.1.code, "languages validated");
        Ok(pair)
    }
}
