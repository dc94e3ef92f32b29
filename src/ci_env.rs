//! CI environment file (`$GITHUB_ENV`) emission
//!
//! Values come from an upstream we don't control, so every value is checked
//! against a conservative character class before anything is appended.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::logging::log_write;

/// Characters allowed in an emitted value.
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/')
}

/// An empty value passes: it stands for a prefix the manifest did not list.
pub fn validate_token(key: &str, value: &str) -> Result<()> {
    if !value.chars().all(is_safe_char) {
        return Err(Error::UnsafeToken {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Append-only `key=value` writer.
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate every pair, then append them all. Nothing is written if any
    /// value is rejected.
    pub fn append(&self, pairs: &[(&str, String)]) -> Result<()> {
        for (key, value) in pairs {
            validate_token(key, value)?;
        }

        let mut lines = String::new();
        for (key, value) in pairs {
            lines.push_str(&format!("{}={}\n", key, value));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))?;
        file.write_all(lines.as_bytes())
            .map_err(|e| Error::io(&self.path, e))?;

        for (key, value) in pairs {
            log_write(&format!("{}={}", key, value));
        }
        Ok(())
    }
}
