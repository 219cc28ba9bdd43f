//! hotel-e2e: behaviour-driven browser tests for the App Runner Hotel
//!
//! ## Usage
//!
//! ```bash
//! hotel-e2e run                              # Run features/ against $BASE_URL
//! hotel-e2e run --tags smoke --fail-fast     # Tagged subset, stop on failure
//! hotel-e2e check features/                  # Every step bound?
//! hotel-e2e steps                            # List the step library
//! hotel-e2e config --base-url http://...     # Effective session config
//! ```

use clap::Parser;
use hotel_e2e_cli::{
    handlers, init_logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(config.verbosity);

    match cli.command {
        Commands::Run(args) => handlers::execute_run(&config, &args),
        Commands::Check(args) => handlers::execute_check(&config, &args),
        Commands::Steps(args) => handlers::execute_steps(&config, &args),
        Commands::Config(args) => handlers::execute_config(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}
