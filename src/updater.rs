//! Update checker
//!
//! Compares the live client prefixes with what the latest companion release
//! claims to contain and raises a dispatch event when they have drifted.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::{self, ReleaseRecord};
use crate::http::HttpClient;
use crate::logging::{log_error, log_info, log_notify, log_warning};
use crate::manifest::{self, LiveVersions};

/// The lqbin prefix lives in the release notes as `lqc.lqbin <prefix>`.
static LQBIN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"lqc\.lqbin\s+(\S+)").expect("valid lqbin pattern"));

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentVersions {
    pub version: String,
    pub liqi_prefix: String,
    pub lqbin_prefix: String,
    pub current_tag: String,
    pub current_lqbin_version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub update_needed: bool,
    pub liqi_update_needed: bool,
    pub lqbin_update_needed: bool,
    pub current_versions: CurrentVersions,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    NotNeeded,
    /// Update needed but no credential configured.
    Skipped,
    Dispatched,
}

/// First token after `lqc.lqbin`, or `""` when the notes don't mention it.
pub fn extract_lqbin_token(body: &str) -> String {
    LQBIN_TOKEN
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn compute_update_result(live: &LiveVersions, release: &ReleaseRecord) -> UpdateResult {
    compute_update_result_at(live, release, Utc::now())
}

pub fn compute_update_result_at(
    live: &LiveVersions,
    release: &ReleaseRecord,
    now: DateTime<Utc>,
) -> UpdateResult {
    let current_lqbin_version = extract_lqbin_token(release.body());

    let liqi_update_needed = release.tag != live.liqi_prefix;
    let lqbin_update_needed = current_lqbin_version != live.lqc_prefix;

    UpdateResult {
        update_needed: liqi_update_needed || lqbin_update_needed,
        liqi_update_needed,
        lqbin_update_needed,
        current_versions: CurrentVersions {
            version: live.version.clone(),
            liqi_prefix: live.liqi_prefix.clone(),
            lqbin_prefix: live.lqc_prefix.clone(),
            current_tag: release.tag.clone(),
            current_lqbin_version,
        },
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn fetch_live_versions(http: &HttpClient, config: &Config) -> Result<LiveVersions> {
    manifest::resolve_live_versions(http, config)
}

pub fn fetch_latest_release(http: &HttpClient, config: &Config) -> Result<ReleaseRecord> {
    github::fetch_latest_release(http, config)
}

/// Dispatch when an update is needed and a credential is present.
/// Failures come back wrapped in [`Error::Dispatch`].
pub fn notify(http: &HttpClient, config: &Config, result: &UpdateResult) -> Result<NotifyOutcome> {
    if !result.update_needed {
        return Ok(NotifyOutcome::NotNeeded);
    }

    let Some(token) = config.github_token.as_deref() else {
        log_warning("GITHUB_TOKEN not set, skipping dispatch");
        return Ok(NotifyOutcome::Skipped);
    };

    log_notify("Update needed, triggering dispatch...");
    match github::dispatch(http, config, token, result) {
        Ok(()) => Ok(NotifyOutcome::Dispatched),
        Err(e) => {
            log_error(&format!("Failed to trigger dispatch: {}", e));
            Err(Error::Dispatch(Box::new(e)))
        }
    }
}

/// fetch → derive → compare, without notifying.
pub fn check(http: &HttpClient, config: &Config) -> Result<UpdateResult> {
    let outcome = fetch_live_versions(http, config).and_then(|live| {
        let release = fetch_latest_release(http, config)?;
        Ok(compute_update_result(&live, &release))
    });

    match outcome {
        Ok(result) => {
            if result.update_needed {
                log_info(&format!(
                    "Update needed (liqi: {}, lqbin: {})",
                    result.liqi_update_needed, result.lqbin_update_needed
                ));
            } else {
                log_info("No updates needed");
            }
            Ok(result)
        }
        Err(e) => {
            log_error(&format!("Error checking updates: {}", e));
            Err(e)
        }
    }
}

/// Full run: check, then notify if `send_dispatch` is set.
pub fn check_for_updates(config: &Config, send_dispatch: bool) -> Result<UpdateResult> {
    let http = HttpClient::new(config);
    let result = check(&http, config)?;
    if send_dispatch {
        notify(&http, config, &result)?;
    }
    Ok(result)
}
