//! Generation commands: submit, wait, download, print the saved paths.

use anyhow::{Context, Result};
use avgen_core::config::AvgenConfig;
use avgen_core::{AvatarClient, AvatarError, JobArtifacts};
use std::path::Path;

/// Runs `job` with a client built from `cfg` on the blocking pool.
async fn run_job<F>(cfg: AvgenConfig, job: F) -> Result<()>
where
    F: FnOnce(&AvatarClient, &Path) -> Result<JobArtifacts, AvatarError> + Send + 'static,
{
    let artifacts = tokio::task::spawn_blocking(move || -> Result<JobArtifacts, AvatarError> {
        let client = AvatarClient::from_config(&cfg)?;
        job(&client, &cfg.output_dir)
    })
    .await
    .context("job task panicked")??;

    print_artifacts(&artifacts);
    Ok(())
}

fn print_artifacts(artifacts: &JobArtifacts) {
    println!("{} task_id {}", artifacts.capability, artifacts.job_id);
    for asset in &artifacts.assets {
        println!("  {}  <- {}", asset.path.display(), asset.remote_url);
    }
}

pub async fn run_image_to_video(cfg: AvgenConfig, image_url: String, audio_url: String) -> Result<()> {
    run_job(cfg, move |client, out| {
        client.image_to_video(&image_url, &audio_url, out)
    })
    .await
}

pub async fn run_voice_over(cfg: AvgenConfig, video_url: String, audio_url: String) -> Result<()> {
    run_job(cfg, move |client, out| {
        client.voice_over(&video_url, &audio_url, out)
    })
    .await
}

pub async fn run_video_translate(
    cfg: AvgenConfig,
    video_url: String,
    source_language: String,
    target_language: String,
    speakers: u32,
) -> Result<()> {
    run_job(cfg, move |client, out| {
        client.video_translate_with_speakers(
            &video_url,
            &source_language,
            &target_language,
            speakers,
            out,
        )
    })
    .await
}
