//! CLI command handlers. Jobs block, so each runs on `spawn_blocking`.

mod download;
mod jobs;
mod languages;

pub use download::run_download;
pub use jobs::{run_image_to_video, run_video_translate, run_voice_over};
pub use languages::run_languages;
