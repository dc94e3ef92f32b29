//! AutoLiqi Logging System
//!
//! Leveled console logging with an optional per-run log file and a run header.

use chrono::{Local, SecondsFormat, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static LOGGER: OnceLock<Arc<Mutex<Logger>>> = OnceLock::new();

// ============================================================================
// Run Information
// ============================================================================

#[derive(Debug, Clone)]
pub struct RunInfo {
    pub app_version: String,
    pub command: String,
    pub manifest_host: String,
    pub repo: String,
}

impl RunInfo {
    pub fn new(command: &str, manifest_host: &str, repo: &str) -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            command: command.to_string(),
            manifest_host: manifest_host.to_string(),
            repo: repo.to_string(),
        }
    }

    pub fn to_log_header(&self) -> String {
        format!(
r#"================================================================================
AutoLiqi Log - {}
================================================================================
Application:   autoliqi v{}
Command:       {}
Manifest host: {}
Repository:    {}
================================================================================"#,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            self.app_version,
            self.command,
            self.manifest_host,
            self.repo,
        )
    }
}

// ============================================================================
// Log Levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Info,
    Fetch,  // Outgoing HTTP requests
    Write,  // Local artifact / env file writes
    Notify, // Dispatch events
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "[INFO]",
            LogLevel::Fetch => "[FETCH]",
            LogLevel::Write => "[WRITE]",
            LogLevel::Notify => "[NOTIFY]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error => "[ERROR]",
        }
    }
}

// ============================================================================
// Logger
// ============================================================================

pub struct Logger {
    log_file: Option<File>,
}

impl Logger {
    /// Console-only logger.
    pub fn console() -> Self {
        Self { log_file: None }
    }

    /// Logger that also appends to `<log_dir>/autoliqi_<timestamp>.log`.
    pub fn with_dir(log_dir: &Path) -> Self {
        let _ = fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("autoliqi_{}.log", timestamp));

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        Self { log_file }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.log_file {
            let _ = writeln!(file, "{}", msg);
            let _ = file.flush();
        }

        // stdout carries the check result
        eprintln!("{}", msg);
    }

    pub fn header(&mut self, info: &RunInfo) {
        self.write_raw(&info.to_log_header());
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        self.write_raw(&format_line(level, message));
    }
}

fn format_line(level: LogLevel, message: &str) -> String {
    let timestamp = Local::now().format("%H:%M:%S");
    format!("[{}] {} {}", timestamp, level.prefix(), message)
}

// ============================================================================
// Global Logger Access
// ============================================================================

/// Initialize the global logger (call once at startup). Replaces the
/// console-only logger that early messages may have created.
pub fn init_logger(log_dir: Option<&Path>, info: &RunInfo) {
    let fresh = match log_dir {
        Some(dir) => Logger::with_dir(dir),
        None => Logger::console(),
    };

    let logger = logger();
    let mut guard = logger.lock();
    *guard = fresh;
    guard.header(info);
}

fn logger() -> Arc<Mutex<Logger>> {
    LOGGER
        .get_or_init(|| Arc::new(Mutex::new(Logger::console())))
        .clone()
}

// ============================================================================
// Convenience Logging Functions
// ============================================================================

pub fn log_info(message: &str) {
    logger().lock().log(LogLevel::Info, message);
}

pub fn log_fetch(message: &str) {
    logger().lock().log(LogLevel::Fetch, message);
}

pub fn log_write(message: &str) {
    logger().lock().log(LogLevel::Write, message);
}

pub fn log_notify(message: &str) {
    logger().lock().log(LogLevel::Notify, message);
}

pub fn log_warning(message: &str) {
    logger().lock().log(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    logger().lock().log(LogLevel::Error, message);
}
