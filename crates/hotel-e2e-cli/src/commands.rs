//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// hotel-e2e: behaviour-driven browser tests for the App Runner Hotel
#[derive(Parser, Debug)]
#[command(name = "hotel-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the application
    Run(RunArgs),

    /// Check that every step resolves to exactly one binding
    Check(CheckArgs),

    /// List the step library
    Steps(StepsArgs),

    /// Show the session configuration
    Config(ConfigArgs),
}

/// Session options shared by `run` and `config`
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Application base URL (overrides BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Remote Chrome DevTools endpoint, e.g. ws://host:9222/devtools/browser/<id>
    /// or http://host:9222 (overrides GRID_URL; Selenium Grid URLs are refused)
    #[arg(long)]
    pub grid_url: Option<String>,

    /// Timeout for every wait in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Launch Chromium without its sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Feature files or directories
    #[arg(default_value = "features")]
    pub paths: Vec<PathBuf>,

    /// Only run scenarios whose name contains this text
    #[arg(short, long)]
    pub name: Option<String>,

    /// Only run scenarios with these tags; prefix with ~ to exclude
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Directory for failure screenshots
    #[arg(long, env = "HOTEL_E2E_ARTIFACTS")]
    pub artifacts: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,

    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Feature files or directories
    #[arg(default_value = "features")]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the steps command
#[derive(Parser, Debug)]
pub struct StepsArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Report format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
