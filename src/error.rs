//! Error types for AutoLiqi
//!
//! Every failure is fatal for the current run. Variants keep enough context
//! (URL, status, path) for the log line that precedes process exit.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, DNS or timeout failure before a response arrived.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Non-2xx response.
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    /// `X-RateLimit-Remaining: 0` on a GitHub API response.
    #[error("GitHub API rate limit exceeded ({url})")]
    RateLimited { url: String },

    /// Body was not the JSON shape we expected.
    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// A value fetched from upstream that is not safe to write as `key=value`.
    #[error("refusing to emit {key}={value:?}: only [A-Za-z0-9._/-] is allowed")]
    UnsafeToken { key: String, value: String },

    #[error("config error: {0}")]
    Config(String),

    /// The check succeeded but the dispatch event could not be delivered.
    #[error("update detected but dispatch failed: {0}")]
    Dispatch(#[source] Box<Error>),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error came from the notification step rather than the check itself.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Error::Dispatch(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
