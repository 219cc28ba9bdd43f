//! Subcommand handlers

use crate::commands::{CheckArgs, ConfigArgs, FormatArg, RunArgs, StepsArgs};
use crate::config::{session_config, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::{render_steps, step_entries, Output};
use hotel_e2e::feature::load_features;
use hotel_e2e::{hotel_steps, ChromiumSessions, ScenarioRunner, SessionFactory};

fn output(config: &CliConfig) -> Output {
    Output::new(config.color.should_color(), config.verbosity.is_quiet())
}

/// `run`: execute scenarios in a real browser
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    run_with(config, args, ChromiumSessions)
}

/// `run` with any session factory
pub fn run_with(
    config: &CliConfig,
    args: &RunArgs,
    factory: impl SessionFactory + 'static,
) -> CliResult<()> {
    let out = output(config);
    let scenarios = load_features(&args.paths)?;
    let session = session_config(&args.session);
    session.validate()?;
    tracing::info!(
        scenarios = scenarios.len(),
        target = ?session.target(),
        "loaded features"
    );

    let mut runner = ScenarioRunner::new(hotel_steps()?, factory, session)
        .with_tags(args.tags.iter().cloned());
    if let Some(name) = &args.name {
        runner = runner.with_name_filter(name.clone());
    }
    if args.fail_fast {
        runner = runner.with_fail_fast();
    }
    if let Some(dir) = &args.artifacts {
        runner = runner.with_artifacts_dir(dir.clone());
    }

    let issues = runner.check(&scenarios);
    if !issues.is_empty() {
        out.issues(&issues);
        return Err(CliError::UnresolvedSteps {
            count: issues.len(),
        });
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("failed to start async runtime: {e}")))?;
    let summary = rt.block_on(runner.run(&scenarios));

    match args.format {
        FormatArg::Text => out.summary(&summary),
        FormatArg::Json => out.json(&summary)?,
    }

    if summary.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: summary.failed_count(),
            total: summary.total_count(),
        })
    }
}

/// `check`: resolve every step without a browser
pub fn execute_check(config: &CliConfig, args: &CheckArgs) -> CliResult<()> {
    let out = output(config);
    let scenarios = load_features(&args.paths)?;
    let registry = hotel_steps()?;
    let steps: usize = scenarios.iter().map(|s| s.steps.len()).sum();

    let runner = ScenarioRunner::new(registry, ChromiumSessions, hotel_e2e::SessionConfig::new());
    let issues = runner.check(&scenarios);
    if issues.is_empty() {
        out.success(&format!(
            "{} scenarios, {steps} steps, every step bound",
            scenarios.len()
        ));
        Ok(())
    } else {
        out.issues(&issues);
        Err(CliError::UnresolvedSteps {
            count: issues.len(),
        })
    }
}

/// `steps`: list the step library
pub fn execute_steps(config: &CliConfig, args: &StepsArgs) -> CliResult<()> {
    let out = output(config);
    let registry = hotel_steps()?;
    match args.format {
        FormatArg::Text => out.line(render_steps(&registry).trim_end()),
        FormatArg::Json => out.json(&step_entries(&registry))?,
    }
    Ok(())
}

/// `config`: print the effective session configuration
pub fn execute_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    let out = output(config);
    out.json(&session_config(&args.session))?;
    Ok(())
}
