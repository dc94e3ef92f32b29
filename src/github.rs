//! Companion repository API: latest release and repository dispatch

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{self, HttpClient};
use crate::logging::{log_error, log_info, log_notify};

pub const API_VERSION: &str = "2022-11-28";
pub const RATE_LIMIT_HEADER: &str = "X-RateLimit-Remaining";
const DISPATCH_ACCEPT: &str = "application/vnd.github.v3+json";

/// Latest published release of the companion repository
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ReleaseRecord {
    #[serde(default, rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl ReleaseRecord {
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

#[derive(Serialize, Debug)]
pub struct DispatchEvent<'a, P: Serialize> {
    pub event_type: &'a str,
    pub client_payload: &'a P,
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Fetch `releases/latest`. The rate-limit header is checked before the
/// status code, so an exhausted quota is reported as [`Error::RateLimited`]
/// even when GitHub answers 403.
pub fn fetch_latest_release(http: &HttpClient, config: &Config) -> Result<ReleaseRecord> {
    let url = config.repo_url("releases/latest");

    let mut request = http.get(&url).set("X-GitHub-Api-Version", API_VERSION);
    if let Some(token) = &config.github_token {
        request = request.set("Authorization", &bearer(token));
    }

    let response = http.call(request)?;
    if response.header(RATE_LIMIT_HEADER) == Some("0") {
        log_error("GitHub API rate limit exceeded");
        return Err(Error::RateLimited { url });
    }

    let response = http::ensure_success(&url, response)?;
    let release: ReleaseRecord = http::read_json(&url, response)?;
    log_info(&format!("Latest release: {}", release.tag));
    Ok(release)
}

/// POST a repository dispatch event. Requires a credential.
pub fn dispatch<P: Serialize>(
    http: &HttpClient,
    config: &Config,
    token: &str,
    payload: &P,
) -> Result<()> {
    let url = config.repo_url("dispatches");
    let event = DispatchEvent {
        event_type: &config.event_type,
        client_payload: payload,
    };

    let request = http
        .post(&url)
        .set("Authorization", &bearer(token))
        .set("Accept", DISPATCH_ACCEPT);

    let response = http.call_json(request, &event)?;
    http::ensure_success(&url, response)?;
    log_notify(&format!("Dispatched '{}' to {}", config.event_type, config.repo));
    Ok(())
}
