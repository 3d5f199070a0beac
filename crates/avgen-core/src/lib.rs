//! Client for a media-generation HTTP API: signed requests to regional
//! endpoints, asynchronous job polling and a parallel chunked downloader for
//! the resulting assets.

pub mod api;
pub mod capability;
pub mod config;
pub mod downloader;
pub mod endpoints;
pub mod error;
pub mod fetch_head;
pub mod language;
pub mod logging;
pub mod orchestrator;
pub mod plan;
pub mod poller;
pub mod signing;

pub use capability::{Capability, JobDescriptor};
pub use error::AvatarError;
pub use orchestrator::{Artifact, AssetKind, AvatarClient, JobArtifacts, JobOrchestrator};
