//! CLI for the avgen media-generation client.

mod commands;

use anyhow::Result;
use avgen_core::config::{self, AvgenConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    run_download, run_image_to_video, run_languages, run_video_translate, run_voice_over,
};

/// Top-level CLI for avgen.
#[derive(Debug, Parser)]
#[command(name = "avgen")]
#[command(about = "avgen: generate avatar videos and download the results", long_about = None)]
pub struct Cli {
    /// Application key (overrides config.toml).
    #[arg(long, global = true, env = "AVGEN_APP_KEY", hide_env_values = true)]
    pub app_key: Option<String>,

    /// Application secret (overrides config.toml).
    #[arg(long, global = true, env = "AVGEN_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,

    /// Endpoint region: "mainland" or "global".
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Directory for downloaded results (default: output_dir from config.toml).
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate a talking-head video from an image and an audio track.
    ImageToVideo {
        /// Public URL of the portrait image.
        image_url: String,
        /// Public URL of the driving audio.
        audio_url: String,
    },

    /// Replace the voice track of an existing video.
    VoiceOver {
        /// Public URL of the source video.
        video_url: String,
        /// Public URL of the new audio (wav).
        audio_url: String,
    },

    /// Translate the speech in a video into another language.
    VideoTranslate {
        /// Public URL of the source video.
        video_url: String,
        /// Spoken language of the video (name or code, e.g. "Chinese" or "zh").
        #[arg(long = "from", value_name = "LANG")]
        source_language: String,
        /// Language to translate into (name or code).
        #[arg(long = "to", value_name = "LANG")]
        target_language: String,
        /// Number of speakers in the video.
        #[arg(long, default_value = "1", value_name = "N")]
        speakers: u32,
    },

    /// List supported translation languages as "name, code, source, target".
    Languages,

    /// Download a URL with parallel ranged requests.
    Download {
        /// Direct HTTP/HTTPS URL.
        url: String,
        /// Output file path.
        output: PathBuf,
        /// Concurrent chunk requests (default from config.toml).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
    },
}

impl Cli {
    /// Config with command-line overrides applied.
    pub fn apply_overrides(&self, mut cfg: AvgenConfig) -> AvgenConfig {
        if let Some(key) = &self.app_key {
            cfg.app_key = Some(key.clone());
        }
        if let Some(secret) = &self.app_secret {
            cfg.app_secret = Some(secret.clone());
        }
        if let Some(region) = &self.region {
            cfg.region = region.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        cfg
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.apply_overrides(config::load_or_init()?);
        tracing::debug!(region = %cfg.region, output_dir = %cfg.output_dir.display(), "loaded config");

        match cli.command {
            CliCommand::ImageToVideo {
                image_url,
                audio_url,
            } => run_image_to_video(cfg, image_url, audio_url).await?,
            CliCommand::VoiceOver {
                video_url,
                audio_url,
            } => run_voice_over(cfg, video_url, audio_url).await?,
            CliCommand::VideoTranslate {
                video_url,
                source_language,
                target_language,
                speakers,
            } => {
                run_video_translate(cfg, video_url, source_language, target_language, speakers)
                    .await?
            }
            CliCommand::Languages => run_languages(),
            CliCommand::Download {
                url,
                output,
                workers,
            } => run_download(cfg, url, output, workers).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
