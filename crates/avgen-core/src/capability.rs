//! Job capabilities as data.
//!
//! Each asynchronous capability is described by a [`CapabilitySpec`]: which
//! services submit and poll it, how the job id is passed to the result
//! endpoint, which status literal means success and which fields carry the
//! produced asset URLs. The poller and orchestrator are driven by this table.

use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::api::ApiRequest;
use crate::language::Language;

/// Status literal shared by every capability while a job is still running.
pub const PENDING_STATUS: &str = "ing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ImageToVideo,
    VoiceOver,
    VideoTranslate,
}

/// How the job id reaches the result endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultQuery {
    /// Appended to the result URL path; GET without parameters.
    PathSuffix,
    /// GET with each listed field set to the job id.
    QueryFields(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySpec {
    pub name: &'static str,
    pub submit_service: &'static str,
    pub result_service: &'static str,
    pub result_query: ResultQuery,
    pub success_status: &'static str,
    pub result_url_field: &'static str,
    pub secondary_url_field: Option<&'static str>,
    pub primary_ext: &'static str,
    pub secondary_ext: &'static str,
}

const IMAGE_TO_VIDEO: CapabilitySpec = CapabilitySpec {
    name: "image-to-video",
    submit_service: "avatar.image_to_video",
    result_service: "avatar.image_to_video_result",
    result_query: ResultQuery::PathSuffix,
    success_status: "suc",
    result_url_field: "resultUrl",
    secondary_url_field: None,
    primary_ext: "mp4",
    secondary_ext: "jpg",
};

const VOICE_OVER: CapabilitySpec = CapabilitySpec {
    name: "voice-over",
    submit_service: "avatar.video_dubbing",
    result_service: "avatar.video_dubbing_result",
    result_query: ResultQuery::QueryFields(&["taskId", "taskUuid"]),
    success_status: "suc",
    result_url_field: "resultUrl",
    secondary_url_field: Some("coverImg"),
    primary_ext: "mp4",
    secondary_ext: "jpg",
};

const VIDEO_TRANSLATE: CapabilitySpec = CapabilitySpec {
    name: "video-translate",
    submit_service: "avatar.video_translate",
    result_service: "avatar.video_translate_result",
    result_query: ResultQuery::PathSuffix,
    success_status: "success",
    result_url_field: "videoUrl",
    secondary_url_field: None,
    primary_ext: "mp4",
    secondary_ext: "jpg",
};

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::ImageToVideo,
        Capability::VoiceOver,
        Capability::VideoTranslate,
    ];

    pub fn spec(self) -> &'static CapabilitySpec {
        match self {
            Capability::ImageToVideo => &IMAGE_TO_VIDEO,
            Capability::VoiceOver => &VOICE_OVER,
            Capability::VideoTranslate => &VIDEO_TRANSLATE,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn submit_request(self, payload: Value) -> ApiRequest {
        ApiRequest::post(self.spec().submit_service, payload)
    }

    pub fn result_request(self, job_id: &str) -> ApiRequest {
        let spec = self.spec();
        match spec.result_query {
            ResultQuery::PathSuffix => {
                ApiRequest::get(spec.result_service, Value::Null).with_path(job_id)
            }
            ResultQuery::QueryFields(fields) => {
                let query: serde_json::Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.to_string(), Value::String(job_id.to_string())))
                    .collect();
                ApiRequest::get(spec.result_service, Value::Object(query))
            }
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown capability '{0}'")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-").to_ascii_lowercase();
        Capability::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// A capability plus the payload to submit. Built by a caller, consumed by one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescriptor {
    pub capability: Capability,
    pub payload: Value,
}

impl JobDescriptor {
    /// Talking-head video from a still image and an audio track.
    pub fn image_to_video(image_url: &str, audio_url: &str) -> Self {
        Self {
            capability: Capability::ImageToVideo,
            payload: json!({
                "imageUrl": image_url,
                "audioUrl": audio_url,
            }),
        }
    }

    /// Re-dub an existing video with a new audio track.
    pub fn voice_over(video_url: &str, audio_url: &str) -> Self {
        Self {
            capability: Capability::VoiceOver,
            payload: json!({
                "videoUrl": video_url,
                "wavUrl": audio_url,
            }),
        }
    }

    /// Translate a video's speech. Languages must already be validated for their roles.
    pub fn video_translate(
        video_url: &str,
        source: &Language,
        target: &Language,
        speaker_num: u32,
    ) -> Self {
        Self {
            capability: Capability::VideoTranslate,
            payload: json!({
                "videoUrl": video_url,
                "speakerNum": speaker_num,
                "originalLanguage": source.code,
                "targetLanguage": target.code,
            }),
        }
    }
}
