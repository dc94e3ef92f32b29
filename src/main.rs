//! AutoLiqi - Mahjong Soul resource tracker
//!
//! `autoliqi fetch` downloads the current artifacts for a release job;
//! `autoliqi check` decides whether such a job needs to run.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use autoliqi::config::Config;
use autoliqi::http::HttpClient;
use autoliqi::logging::{init_logger, log_error, log_info, RunInfo};
use autoliqi::{fetcher, updater};

#[derive(Parser)]
#[command(name = "autoliqi", version, about)]
struct Cli {
    /// TOML config file (defaults to <config dir>/autoliqi/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download liqi.json, code.js and lqc.lqbin and emit their identifiers
    Fetch {
        /// Where to write the artifacts
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// CI environment file to append to (overrides $GITHUB_ENV)
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
    /// Compare live prefixes with the latest release and dispatch if stale
    Check {
        /// Compute and print the result without sending a dispatch event
        #[arg(long)]
        no_notify: bool,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Fetch { .. } => "fetch",
            Command::Check { .. } => "check",
        }
    }
}

fn load_config(cli: &Cli) -> autoliqi::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Command::Fetch { output_dir, env_file } = &cli.command {
        if let Some(dir) = output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(path) = env_file {
            config.github_env = Some(path.clone());
        }
    }
    Ok(config)
}

fn run_check(config: &Config, send_dispatch: bool) -> ExitCode {
    let http = HttpClient::new(config);

    let result = match updater::check(&http, config) {
        Ok(result) => result,
        Err(e) => {
            log_error(&format!("Could not determine update status: {}", e));
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => log_error(&format!("Could not serialize result: {}", e)),
    }

    if !send_dispatch {
        return ExitCode::SUCCESS;
    }
    match updater::notify(&http, config, &result) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&format!("Update was detected but could not be announced: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("autoliqi: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logger(
        config.log_dir.as_deref(),
        &RunInfo::new(cli.command.name(), &config.manifest_base_url, &config.repo),
    );

    match &cli.command {
        Command::Fetch { .. } => match fetcher::run(&config) {
            Ok(report) => {
                log_info(&format!("Wrote {} artifacts", report.files.len()));
                ExitCode::SUCCESS
            }
            Err(e) => {
                log_error(&format!("Fetch failed: {}", e));
                ExitCode::FAILURE
            }
        },
        Command::Check { no_notify } => run_check(&config, !no_notify),
    }
}
