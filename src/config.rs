use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::logging::log_warning;

pub const DEFAULT_MANIFEST_BASE_URL: &str = "https://game.maj-soul.com/1";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REPO: &str = "Xerxes-2/AutoLiqi";
pub const DEFAULT_EVENT_TYPE: &str = "update_available";
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36"
);
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_ENV: &str = "GITHUB_ENV";
pub const ENV_MANIFEST_URL: &str = "AUTOLIQI_MANIFEST_URL";
pub const ENV_GITHUB_API_URL: &str = "AUTOLIQI_GITHUB_API_URL";
pub const ENV_REPO: &str = "AUTOLIQI_REPO";

// ============================================================================
// Main Config
// ============================================================================

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base of the client host, without trailing slash (`.../1`).
    pub manifest_base_url: String,
    pub github_api_url: String,
    /// Companion repository as `owner/name`.
    pub repo: String,
    pub event_type: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
    pub log_dir: Option<PathBuf>,

    #[serde(skip)]
    pub github_token: Option<String>,
    #[serde(skip)]
    pub github_env: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_base_url: DEFAULT_MANIFEST_BASE_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            repo: DEFAULT_REPO.to_string(),
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output_dir: PathBuf::from("."),
            log_dir: None,
            github_token: None,
            github_env: None,
        }
    }
}

impl Config {
    /// `~/.config/autoliqi/config.toml` (or the platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("autoliqi").join("config.toml"))
    }

    /// Load from an explicit file. The file must exist and parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Explicit path is strict; the default location is optional and falls
    /// back to built-in defaults when absent or unreadable.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        match Self::from_file(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                log_warning(&format!("Ignoring config file: {}", e));
                Ok(Self::default())
            }
        }
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup. Empty values count as unset.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(token) = get(ENV_GITHUB_TOKEN) {
            self.github_token = Some(token);
        }
        if let Some(path) = get(ENV_GITHUB_ENV) {
            self.github_env = Some(PathBuf::from(path));
        }
        if let Some(url) = get(ENV_MANIFEST_URL) {
            self.manifest_base_url = url;
        }
        if let Some(url) = get(ENV_GITHUB_API_URL) {
            self.github_api_url = url;
        }
        if let Some(repo) = get(ENV_REPO) {
            self.repo = repo;
        }
    }

    pub fn manifest_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.manifest_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.github_api_url.trim_end_matches('/'),
            self.repo,
            path.trim_start_matches('/')
        )
    }
}
