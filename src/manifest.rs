//! Client manifest lookup
//!
//! `version.json` names the current build; `resversion{version}.json` maps
//! each resource path to the prefix it is served under. Both jobs resolve
//! their prefixes through [`resolve_live_versions`].

use serde::Deserialize;
use std::collections::HashMap;

use crate::config::Config;
use crate::error::Result;
use crate::http::HttpClient;
use crate::logging::{log_info, log_warning};

pub const LIQI_PATH: &str = "res/proto/liqi.json";
pub const LQBIN_PATH: &str = "res/config/lqc.lqbin";

// ============================================================================
// Manifest Types
// ============================================================================

/// `GET /1/version.json`. Both fields are required.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VersionManifest {
    pub version: String,
    /// Path of the bootstrap script, relative to the manifest base.
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceEntry {
    #[serde(default)]
    pub prefix: Option<String>,
}

/// `GET /1/resversion{version}.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceVersionManifest {
    #[serde(default)]
    pub res: HashMap<String, ResourceEntry>,
}

impl ResourceVersionManifest {
    /// Prefix for a resource path, or `""` when the entry or its prefix is
    /// missing or null.
    pub fn prefix(&self, path: &str) -> String {
        self.res
            .get(path)
            .and_then(|entry| entry.prefix.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePrefixes {
    pub liqi_prefix: String,
    pub lqc_prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveVersions {
    pub version: String,
    pub code: String,
    pub liqi_prefix: String,
    pub lqc_prefix: String,
}

// ============================================================================
// Fetch Functions
// ============================================================================

pub fn fetch_version(http: &HttpClient, config: &Config) -> Result<VersionManifest> {
    let url = config.manifest_url("version.json");
    let manifest: VersionManifest = http.get_json(&url)?;
    log_info(&format!("Client version: {}", manifest.version));
    Ok(manifest)
}

pub fn fetch_resource_manifest(
    http: &HttpClient,
    config: &Config,
    version: &str,
) -> Result<ResourceVersionManifest> {
    let url = config.manifest_url(&format!("resversion{}.json", version));
    http.get_json(&url)
}

/// Missing keys resolve to empty prefixes rather than failing.
pub fn fetch_resource_prefixes(
    http: &HttpClient,
    config: &Config,
    version: &str,
) -> Result<ResourcePrefixes> {
    let manifest = fetch_resource_manifest(http, config, version)?;
    let prefixes = ResourcePrefixes {
        liqi_prefix: manifest.prefix(LIQI_PATH),
        lqc_prefix: manifest.prefix(LQBIN_PATH),
    };

    if prefixes.liqi_prefix.is_empty() {
        log_warning(&format!("No prefix for {} in resversion{}", LIQI_PATH, version));
    }
    if prefixes.lqc_prefix.is_empty() {
        log_warning(&format!("No prefix for {} in resversion{}", LQBIN_PATH, version));
    }

    Ok(prefixes)
}

/// version.json followed by resversion{version}.json, re-fetched every call.
pub fn resolve_live_versions(http: &HttpClient, config: &Config) -> Result<LiveVersions> {
    let manifest = fetch_version(http, config)?;
    let prefixes = fetch_resource_prefixes(http, config, &manifest.version)?;
    log_info(&format!(
        "Live prefixes: liqi={} lqbin={}",
        prefixes.liqi_prefix, prefixes.lqc_prefix
    ));

    Ok(LiveVersions {
        version: manifest.version,
        code: manifest.code,
        liqi_prefix: prefixes.liqi_prefix,
        lqc_prefix: prefixes.lqc_prefix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_from_resversion_document() {
        let json = r#"{
            "res": {
                "res/proto/liqi.json": {"prefix": "v0.11.123.w"},
                "res/config/lqc.lqbin": {"prefix": "v0.11.120.w"},
                "res/atlas/x.png": {"prefix": "v0.1.0.w"}
            }
        }"#;
        let manifest: ResourceVersionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.prefix(LIQI_PATH), "v0.11.123.w");
        assert_eq!(manifest.prefix(LQBIN_PATH), "v0.11.120.w");
    }

    #[test]
    fn missing_entries_default_to_empty() {
        let json = r#"{"res": {"res/proto/liqi.json": {}}}"#;
        let manifest: ResourceVersionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.prefix(LIQI_PATH), "");
        assert_eq!(manifest.prefix(LQBIN_PATH), "");

        let empty: ResourceVersionManifest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.prefix(LIQI_PATH), "");
    }

    #[test]
    fn null_prefix_defaults_to_empty() {
        let json = r#"{
            "res": {
                "res/proto/liqi.json": {"prefix": null},
                "res/config/lqc.lqbin": {"prefix": "v0.11.120.w"}
            }
        }"#;
        let manifest: ResourceVersionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.prefix(LIQI_PATH), "");
        assert_eq!(manifest.prefix(LQBIN_PATH), "v0.11.120.w");
    }

    #[test]
    fn version_manifest_requires_both_fields() {
        let json = r#"{
            "version": "0.11.123.w",
            "code": "v0.11.123.w/code.js",
            "force_version": "0.10.0"
        }"#;
        let ok: VersionManifest = serde_json::from_str(json).unwrap();
        assert_eq!(ok.code, "v0.11.123.w/code.js");

        assert!(serde_json::from_str::<VersionManifest>(r#"{"version": "0.11.123.w"}"#).is_err());
    }
}
