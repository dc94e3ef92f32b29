//! Update checker against a mock client host and GitHub API.

mod common;

use autoliqi::updater::{self, NotifyOutcome};
use autoliqi::http::HttpClient;
use autoliqi::Error;
use common::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn in_sync_release_needs_no_update() {
    let server = MockServer::start().await;
    mount_manifests(&server, "abc123", "x1").await;
    mount_release(&server, "abc123", "Protocol update\n\nlqc.lqbin x1\n").await;
    forbid_dispatch(&server).await;

    let mut config = config_for(&server);
    config.github_token = Some("t0ken".to_string());

    let result = blocking(move || updater::check_for_updates(&config, true))
        .await
        .unwrap();

    assert!(!result.update_needed);
    assert!(!result.liqi_update_needed);
    assert!(!result.lqbin_update_needed);
    assert_eq!(result.current_versions.version, VERSION);
    assert_eq!(result.current_versions.current_tag, "abc123");
    assert_eq!(result.current_versions.current_lqbin_version, "x1");
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_lqbin_dispatches_full_result() {
    let server = MockServer::start().await;
    mount_manifests(&server, "abc123", "x1").await;
    mount_release(&server, "abc123", "lqc.lqbin x0").await;

    Mock::given(method("POST"))
        .and(path(format!("/repos/{}/dispatches", REPO)))
        .and(header("Authorization", "Bearer t0ken"))
        .and(header("Accept", "application/vnd.github.v3+json"))
        .and(body_partial_json(json!({
            "event_type": "update_available",
            "client_payload": {
                "updateNeeded": true,
                "liqiUpdateNeeded": false,
                "lqbinUpdateNeeded": true,
                "currentVersions": {
                    "version": VERSION,
                    "liqiPrefix": "abc123",
                    "lqbinPrefix": "x1",
                    "currentTag": "abc123",
                    "currentLqbinVersion": "x0"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.github_token = Some("t0ken".to_string());

    let result = blocking(move || updater::check_for_updates(&config, true))
        .await
        .unwrap();

    assert!(result.update_needed);
    assert!(result.lqbin_update_needed);
    assert!(result.timestamp.ends_with('Z'));
}

#[tokio::test(flavor = "multi_thread")]
async fn rate_limited_release_aborts_before_status_check() {
    let server = MockServer::start().await;
    mount_manifests(&server, "abc123", "x1").await;
    forbid_dispatch(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/releases/latest", REPO)))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("X-RateLimit-Remaining", "0")
                .set_body_json(json!({"message": "API rate limit exceeded"})),
        )
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.github_token = Some("t0ken".to_string());

    let err = blocking(move || updater::check_for_updates(&config, true))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }), "got {:?}", err);
}

#[tokio::test(flavor = "multi_thread")]
async fn rate_limit_header_wins_even_on_success_status() {
    let server = MockServer::start().await;
    mount_manifests(&server, "abc123", "x1").await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/releases/latest", REPO)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Remaining", "0")
                .set_body_json(json!({"tag_name": "abc123", "body": "lqc.lqbin x1"})),
        )
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = blocking(move || {
        let http = HttpClient::new(&config);
        updater::fetch_latest_release(&http, &config)
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_credential_skips_dispatch() {
    let server = MockServer::start().await;
    mount_manifests(&server, "new-prefix", "x1").await;
    mount_release(&server, "old-prefix", "lqc.lqbin x1").await;
    forbid_dispatch(&server).await;

    let config = config_for(&server);
    assert!(config.github_token.is_none());

    let (result, outcome) = blocking(move || {
        let http = HttpClient::new(&config);
        let result = updater::check(&http, &config).unwrap();
        let outcome = updater::notify(&http, &config, &result).unwrap();
        (result, outcome)
    })
    .await;

    assert!(result.update_needed);
    assert!(result.liqi_update_needed);
    assert_eq!(outcome, NotifyOutcome::Skipped);
}

#[tokio::test(flavor = "multi_thread")]
async fn release_request_carries_api_version_and_token() {
    let server = MockServer::start().await;
    mount_manifests(&server, "abc123", "x1").await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/releases/latest", REPO)))
        .and(header("X-GitHub-Api-Version", "2022-11-28"))
        .and(header("Authorization", "Bearer t0ken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": "abc123",
            "body": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.github_token = Some("t0ken".to_string());

    let result = blocking(move || updater::check_for_updates(&config, false))
        .await
        .unwrap();

    assert!(!result.liqi_update_needed);
    assert!(result.lqbin_update_needed);
    assert_eq!(result.current_versions.current_lqbin_version, "");
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_prefix_keys_resolve_to_empty() {
    let server = MockServer::start().await;
    mount_version(&server).await;
    mount_resversion(&server, json!({ "res/proto/liqi.json": { "prefix": "abc123" } })).await;
    mount_release(&server, "abc123", "no lqbin mentioned here").await;

    let config = config_for(&server);
    let result = blocking(move || updater::check_for_updates(&config, false))
        .await
        .unwrap();

    assert_eq!(result.current_versions.lqbin_prefix, "");
    assert_eq!(result.current_versions.current_lqbin_version, "");
    assert!(!result.update_needed);
}

#[tokio::test(flavor = "multi_thread")]
async fn manifest_server_error_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/version.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/releases/latest", REPO)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = blocking(move || updater::check_for_updates(&config, true))
        .await
        .unwrap_err();

    match err {
        Error::Status { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_version_manifest_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/version.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": "x.js" })))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = blocking(move || updater::check_for_updates(&config, false))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }), "got {:?}", err);
}

#[tokio::test(flavor = "multi_thread")]
async fn dispatch_failure_is_reported_separately() {
    let server = MockServer::start().await;
    mount_manifests(&server, "abc123", "x1").await;
    mount_release(&server, "older", "lqc.lqbin x1").await;

    Mock::given(method("POST"))
        .and(path(format!("/repos/{}/dispatches", REPO)))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.github_token = Some("t0ken".to_string());

    let err = blocking(move || updater::check_for_updates(&config, true))
        .await
        .unwrap_err();

    assert!(err.is_dispatch());
    match err {
        Error::Dispatch(inner) => {
            assert!(matches!(*inner, Error::Status { status: 404, .. }));
        }
        other => panic!("expected dispatch error, got {:?}", other),
    }
}
