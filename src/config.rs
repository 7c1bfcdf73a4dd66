use clap::{ArgAction, Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

use crate::suggest::DEFAULT_THRESHOLD;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Parser, Debug)]
#[command(
    name = "kitchen-command",
    version,
    about = "HTTP API server for Fort Kitchen Command"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub config: Config,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum Commands {
    /// Wipe the stored pantry and recipes, then exit
    Reset,
}

/// Kitchen server configuration
#[derive(Parser, Debug, Clone)]
pub struct Config {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (-q, -qq, -qqq)
    #[arg(short = 'q', action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Address to bind the HTTP server to
    #[arg(long, env = "KITCHEN_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Database path (pantry and recipe snapshots)
    #[arg(long, env = "KITCHEN_DATABASE_PATH", default_value = "kitchen.sqlite")]
    pub database_path: PathBuf,

    /// Log file path (logs are written to stdout + this file)
    #[arg(long, env = "KITCHEN_LOG_FILE", default_value = "kitchen.logs")]
    pub log_file: PathBuf,

    /// CORS allowed origin (e.g., <https://kitchen.example.com>)
    /// If not set, allows all origins
    #[arg(long, env = "KITCHEN_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Minimum pantry coverage for a recipe to be suggested, in [0, 1]
    #[arg(
        long,
        env = "KITCHEN_SUGGEST_THRESHOLD",
        default_value_t = DEFAULT_THRESHOLD,
        value_parser = parse_threshold
    )]
    pub suggest_threshold: f64,

    /// Timeout for fetching a recipe page, in seconds
    #[arg(long, env = "KITCHEN_IMPORT_TIMEOUT_SECS", default_value_t = 10)]
    pub import_timeout_secs: u64,

    /// User-Agent sent when fetching recipe pages
    #[arg(long, env = "KITCHEN_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

/// Parse a coverage threshold and reject anything outside `[0, 1]`.
///
/// # Errors
/// Returns a message when the value is not a number in range.
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{s:?} is not a number"))?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("threshold must be within [0, 1], got {v}"))
    }
}

impl Config {
    #[must_use]
    pub fn verbosity_delta(&self) -> i16 {
        i16::from(self.verbose) - i16::from(self.quiet)
    }

    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity_delta() {
            d if d <= -2 => "error",
            -1 => "warn",
            0 => "info,kitchen_command=info,axum=info,tower_http=info",
            1 => "debug,kitchen_command=debug,axum=info,tower_http=info,sqlx=warn,html5ever=warn",
            2 => "trace,kitchen_command=trace,axum=debug,tower_http=trace,sqlx=info,hyper=info,html5ever=info",
            _ => "trace,kitchen_command=trace,axum=trace,tower_http=trace,sqlx=debug,hyper=debug",
        }
    }

    #[must_use]
    pub const fn import_timeout(&self) -> Duration {
        Duration::from_secs(self.import_timeout_secs)
    }
}

impl Default for Config {
    /// Built-in defaults, ignoring the environment. Used by tests and embedders.
    fn default() -> Self {
        Self {
            verbose: 0,
            quiet: 0,
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_path: PathBuf::from("kitchen.sqlite"),
            log_file: PathBuf::from("kitchen.logs"),
            cors_origin: None,
            suggest_threshold: DEFAULT_THRESHOLD,
            import_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
