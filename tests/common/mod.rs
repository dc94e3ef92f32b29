#![allow(dead_code)]

use autoliqi::Config;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REPO: &str = "owner/tracker";
pub const VERSION: &str = "0.11.123.w";

/// Run the blocking client off the async test thread.
pub async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.manifest_base_url = format!("{}/1", server.uri());
    config.github_api_url = server.uri();
    config.repo = REPO.to_string();
    config.timeout_secs = 5;
    config
}

pub async fn mount_version(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/1/version.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": VERSION,
            "force_version": "0.10.0.w",
            "code": format!("v{}/code.js", VERSION)
        })))
        .mount(server)
        .await;
}

pub async fn mount_resversion(server: &MockServer, res: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/1/resversion{}.json", VERSION)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "res": res })))
        .mount(server)
        .await;
}

pub async fn mount_manifests(server: &MockServer, liqi_prefix: &str, lqc_prefix: &str) {
    mount_version(server).await;
    mount_resversion(
        server,
        json!({
            "res/proto/liqi.json": { "prefix": liqi_prefix },
            "res/config/lqc.lqbin": { "prefix": lqc_prefix },
            "res/atlas/ui.png": { "prefix": "v0.9.0.w" }
        }),
    )
    .await;
}

pub async fn mount_release(server: &MockServer, tag: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/releases/latest", REPO)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": tag,
            "body": body,
            "assets": []
        })))
        .mount(server)
        .await;
}

/// Dispatch endpoint that must never be hit.
pub async fn forbid_dispatch(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/repos/{}/dispatches", REPO)))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(server)
        .await;
}
