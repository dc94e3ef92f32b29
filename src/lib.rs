//! AutoLiqi - Mahjong Soul resource tracker
//!
//! Library crate behind the `autoliqi` binary: resolves the live client
//! resource prefixes, downloads the protocol/config artifacts, and detects
//! when the companion repository's latest release has fallen behind.

pub mod ci_env;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod http;
pub mod logging;
pub mod manifest;
pub mod updater;

pub use config::Config;
pub use error::{Error, Result};
pub use updater::UpdateResult;
