//! End-to-end: signed submit, polling and asset download against a local server.

mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use avgen_core::api::ApiClient;
use avgen_core::downloader::{DownloadOptions, ParallelDownloader};
use avgen_core::endpoints::{ServiceTable, REGION_MAINLAND};
use avgen_core::language::LanguageError;
use avgen_core::poller::{JobError, JobPoller, PollPolicy};
use avgen_core::signing::{signature, Credentials};
use avgen_core::{AssetKind, AvatarClient, AvatarError, JobOrchestrator};
use common::mock_server::{FileOptions, MockServer};
use serde_json::json;
use tempfile::tempdir;

const SERVICES: &[(&str, &str)] = &[
    ("avatar.image_to_video", "/i2v"),
    ("avatar.image_to_video_result", "/i2v/result/"),
    ("avatar.video_dubbing", "/dub"),
    ("avatar.video_dubbing_result", "/dub/detail"),
    ("avatar.video_translate", "/translate"),
    ("avatar.video_translate_result", "/translate/result/"),
];

fn client(server: &MockServer) -> AvatarClient {
    let table = SERVICES.iter().fold(ServiceTable::empty(), |t, (key, path)| {
        t.with_service(REGION_MAINLAND, key, server.url(path))
    });
    let api = ApiClient::new(
        Arc::new(Credentials::new("demo-key", "demo-secret")),
        Arc::new(table),
        REGION_MAINLAND,
    )
    .with_timeout(Duration::from_secs(5));
    let policy = PollPolicy {
        interval: Duration::from_millis(20),
        deadline: Some(Duration::from_secs(30)),
        ..PollPolicy::default()
    };
    let downloader = ParallelDownloader::new(DownloadOptions {
        workers: 4,
        chunk_read_size: 4096,
    });
    AvatarClient::new(JobOrchestrator::new(JobPoller::new(api, policy), downloader))
}

fn video_bytes() -> Vec<u8> {
    (0u8..200).cycle().take(48 * 1024 + 3).collect()
}

#[test]
fn image_to_video_downloads_result_named_by_job_id() {
    let server = MockServer::start();
    let video = video_bytes();
    server.file("/files/out.mp4", video.clone(), FileOptions::default());
    server.json("POST", "/i2v", &[json!({"code": 200, "data": "J1"})]);
    server.json(
        "GET",
        "/i2v/result/J1",
        &[
            json!({"code": 200, "data": {"status": "ing"}}),
            json!({"code": 200, "data": {"status": "ing"}}),
            json!({"code": 200, "data": {"status": "suc", "resultUrl": server.url("/files/out.mp4")}}),
        ],
    );

    let out = tempdir().unwrap();
    let artifacts = client(&server)
        .image_to_video("https://img/a.png", "https://aud/a.wav", out.path())
        .expect("job");

    assert_eq!(artifacts.job_id.as_str(), "J1");
    assert_eq!(artifacts.assets.len(), 1);
    let primary = artifacts.primary().unwrap();
    assert_eq!(primary.path, out.path().join("J1.mp4"));
    assert_eq!(primary.remote_url, server.url("/files/out.mp4"));
    assert_eq!(fs::read(&primary.path).unwrap(), video);
    assert_eq!(server.requests_to("/i2v/result/J1").len(), 3);

    let submit = &server.requests_to("/i2v")[0];
    assert_eq!(submit.method, "POST");
    let payload: serde_json::Value = serde_json::from_slice(&submit.body).unwrap();
    assert_eq!(payload, json!({"imageUrl": "https://img/a.png", "audioUrl": "https://aud/a.wav"}));
    assert_eq!(submit.header("appKey"), Some("demo-key"));
    let timestamp: u64 = submit.header("timestamp").unwrap().parse().unwrap();
    assert_eq!(
        submit.header("signature"),
        Some(signature("demo-key", "demo-secret", timestamp).as_str())
    );
}

#[test]
fn voice_over_writes_video_and_cover() {
    let server = MockServer::start();
    let video = video_bytes();
    let cover: Vec<u8> = b"\xff\xd8\xff\xe0 fake jpeg".to_vec();
    server.file("/files/dub.mp4", video.clone(), FileOptions::default());
    server.file("/files/cover.jpg", cover.clone(), FileOptions::default());
    server.json("POST", "/dub", &[json!({"code": 200, "data": 9041})]);
    server.json(
        "GET",
        "/dub/detail",
        &[json!({"code": 200, "data": {
            "status": "suc",
            "resultUrl": server.url("/files/dub.mp4"),
            "coverImg": server.url("/files/cover.jpg"),
        }})],
    );

    let out = tempdir().unwrap();
    let artifacts = client(&server)
        .voice_over("https://v/in.mp4", "https://a/new.wav", out.path())
        .expect("job");

    assert_eq!(artifacts.job_id.as_str(), "9041");
    assert_eq!(fs::read(out.path().join("9041.mp4")).unwrap(), video);
    assert_eq!(fs::read(out.path().join("9041.jpg")).unwrap(), cover);
    assert_eq!(artifacts.cover().unwrap().kind, AssetKind::Cover);

    let poll = &server.requests_to("/dub/detail")[0];
    assert_eq!(poll.method, "GET");
    let query = poll.query.as_deref().unwrap_or_default();
    assert!(query.contains("taskId=9041"), "{}", query);
    assert!(query.contains("taskUuid=9041"), "{}", query);

    let submit: serde_json::Value =
        serde_json::from_slice(&server.requests_to("/dub")[0].body).unwrap();
    assert_eq!(submit["wavUrl"], "https://a/new.wav");
}

#[test]
fn video_translate_failure_carries_status_and_message() {
    let server = MockServer::start();
    server.json("POST", "/translate", &[json!({"code": 200, "data": "T7"})]);
    server.json(
        "GET",
        "/translate/result/T7",
        &[json!({"code": 200, "data": {"status": "fail", "msg": "no speech found"}})],
    );

    let out = tempdir().unwrap();
    let err = client(&server)
        .video_translate("https://v/in.mp4", "Chinese", "english", out.path())
        .unwrap_err();

    match err {
        AvatarError::Job(JobError::Failed {
            job_id,
            code,
            message,
            ..
        }) => {
            assert_eq!(job_id, "T7");
            assert_eq!(code, "fail");
            assert_eq!(message, "no speech found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);

    let submit: serde_json::Value =
        serde_json::from_slice(&server.requests_to("/translate")[0].body).unwrap();
    assert_eq!(
        submit,
        json!({"videoUrl": "https://v/in.mp4", "speakerNum": 1, "originalLanguage": "zh", "targetLanguage": "en"})
    );
}

#[test]
fn video_translate_rejects_language_before_any_request() {
    let server = MockServer::start();

    let out = tempdir().unwrap();
    let err = client(&server)
        .video_translate("https://v/in.mp4", "English", "Afrikaans", out.path())
        .unwrap_err();

    assert!(matches!(
        err,
        AvatarError::Validation(LanguageError::RoleMismatch { .. })
    ));
    assert!(server.requests().is_empty());
}

#[test]
fn rejected_submission_is_fatal() {
    let server = MockServer::start();
    server.json(
        "POST",
        "/i2v",
        &[json!({"code": 401, "msg": "signature mismatch"})],
    );

    let out = tempdir().unwrap();
    let err = client(&server)
        .image_to_video("https://img/a.png", "https://aud/a.wav", out.path())
        .unwrap_err();

    match err {
        AvatarError::Job(JobError::SubmissionFailed { reason, .. }) => {
            assert!(reason.contains("signature mismatch"), "{}", reason);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn task_id_escaping_output_dir_is_refused() {
    let server = MockServer::start();
    server.file("/files/out.mp4", video_bytes(), FileOptions::default());
    server.json("POST", "/i2v", &[json!({"code": 200, "data": "../escaped"})]);

    let root = tempdir().unwrap();
    let out = root.path().join("out");
    let err = client(&server)
        .image_to_video("https://img/a.png", "https://aud/a.wav", &out)
        .unwrap_err();

    assert!(
        matches!(err, AvatarError::Job(JobError::SubmissionFailed { .. })),
        "{:?}",
        err
    );
    assert!(!root.path().join("escaped.mp4").exists());
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn unknown_region_fails_without_network() {
    let server = MockServer::start();
    let api = ApiClient::new(
        Arc::new(Credentials::new("k", "s")),
        Arc::new(ServiceTable::builtin()),
        "global",
    );
    let poller = JobPoller::new(api, PollPolicy::default());
    let client = AvatarClient::new(JobOrchestrator::new(poller, ParallelDownloader::default()));

    let out = tempdir().unwrap();
    let err = client
        .image_to_video("https://img/a.png", "https://aud/a.wav", out.path())
        .unwrap_err();

    assert!(format!("{}", err).contains("avatar.image_to_video"), "{}", err);
    assert!(server.requests().is_empty());
}
