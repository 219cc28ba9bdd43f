//! hotel-e2e CLI library
//!
//! Command-line front end for the hotel scenario suite: run scenarios,
//! check step coverage, list the step library and show the effective
//! session configuration.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    CheckArgs, Cli, ColorArg, Commands, ConfigArgs, FormatArg, RunArgs, SessionArgs, StepsArgs,
};
pub use config::{session_config, session_config_from, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_steps, step_entries, Output, StepEntry};

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over the level implied by `-q`/`-v`. Logs go to stderr so
/// JSON reports on stdout stay parseable.
pub fn init_logging(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
