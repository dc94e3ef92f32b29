//! Version fetcher
//!
//! Downloads the current protocol schema, config table and bootstrap script,
//! writes them to the output directory and records their identifiers in the
//! CI environment file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ci_env::{self, EnvFile};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::logging::{log_info, log_write};
use crate::manifest::{self, LiveVersions, LIQI_PATH, LQBIN_PATH};

pub const LIQI_FILE: &str = "liqi.json";
pub const CODE_JS_FILE: &str = "code.js";
pub const LQBIN_FILE: &str = "lqc.lqbin";

pub const KEY_CODE_JS: &str = "code-js";
pub const KEY_LIQI_JSON: &str = "liqi-json";
pub const KEY_LQC_LQBIN: &str = "lqc-lqbin";

/// Raw response bodies, persisted byte for byte.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub liqi_json: Vec<u8>,
    pub code_js: Vec<u8>,
    pub lqc_lqbin: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub versions: LiveVersions,
    pub files: Vec<PathBuf>,
}

fn artifact_url(config: &Config, prefix: &str, path: &str) -> String {
    config.manifest_url(&format!("{}/{}", prefix.trim_matches('/'), path))
}

/// `GET /1/{prefix}/{path}`
pub fn fetch_artifact(
    http: &HttpClient,
    config: &Config,
    prefix: &str,
    path: &str,
) -> Result<Vec<u8>> {
    http.get_bytes(&artifact_url(config, prefix, path))
}

/// `GET /1/{code}`
pub fn fetch_bootstrap_script(http: &HttpClient, config: &Config, code: &str) -> Result<Vec<u8>> {
    http.get_bytes(&config.manifest_url(code))
}

pub fn fetch_artifacts(
    http: &HttpClient,
    config: &Config,
    live: &LiveVersions,
) -> Result<Artifacts> {
    let code_js = fetch_bootstrap_script(http, config, &live.code)?;
    let lqc_lqbin = fetch_artifact(http, config, &live.lqc_prefix, LQBIN_PATH)?;
    let liqi_json = fetch_artifact(http, config, &live.liqi_prefix, LIQI_PATH)?;

    Ok(Artifacts {
        liqi_json,
        code_js,
        lqc_lqbin,
    })
}

/// The three env lines for a run. A missing prefix is emitted as `key=`.
pub fn env_pairs(live: &LiveVersions) -> Vec<(&'static str, String)> {
    vec![
        (KEY_CODE_JS, format!("v{}", live.version)),
        (KEY_LIQI_JSON, live.liqi_prefix.clone()),
        (KEY_LQC_LQBIN, live.lqc_prefix.clone()),
    ]
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::io(path, e))?;
    log_write(&format!("{} ({} bytes)", path.display(), contents.len()));
    Ok(())
}

/// Reject identifiers that are unsafe to write as `key=value` lines.
pub fn validate_identifiers(live: &LiveVersions) -> Result<()> {
    for (key, value) in env_pairs(live) {
        ci_env::validate_token(key, &value)?;
    }
    Ok(())
}

/// Write the artifacts (overwriting) and append the identifiers to `env`.
/// Identifiers are validated before any file is touched.
pub fn persist_and_emit(
    output_dir: &Path,
    env: &EnvFile,
    live: &LiveVersions,
    artifacts: &Artifacts,
) -> Result<Vec<PathBuf>> {
    validate_identifiers(live)?;
    let pairs = env_pairs(live);

    fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

    let liqi_path = output_dir.join(LIQI_FILE);
    let code_path = output_dir.join(CODE_JS_FILE);
    let lqbin_path = output_dir.join(LQBIN_FILE);

    write_file(&liqi_path, &artifacts.liqi_json)?;
    write_file(&code_path, &artifacts.code_js)?;
    write_file(&lqbin_path, &artifacts.lqc_lqbin)?;

    env.append(&pairs)?;

    Ok(vec![liqi_path, code_path, lqbin_path])
}

/// Full fetcher run.
pub fn run(config: &Config) -> Result<FetchReport> {
    let env_path = config
        .github_env
        .clone()
        .ok_or(Error::MissingEnv(crate::config::ENV_GITHUB_ENV))?;
    let env = EnvFile::new(env_path);

    let http = HttpClient::new(config);
    let live = manifest::resolve_live_versions(&http, config)?;
    validate_identifiers(&live)?;
    let artifacts = fetch_artifacts(&http, config, &live)?;
    let files = persist_and_emit(&config.output_dir, &env, &live, &artifacts)?;

    log_info(&format!(
        "Fetched client v{} (liqi {}, lqbin {})",
        live.version, live.liqi_prefix, live.lqc_prefix
    ));

    Ok(FetchReport {
        versions: live,
        files,
    })
}
