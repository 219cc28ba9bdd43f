//! Scenario runner.
//!
//! Every selected scenario runs in its own session. Steps run in order and
//! the first failure skips the rest of the scenario; the next scenario still
//! starts unless fail-fast is set.

use crate::config::SessionConfig;
use crate::feature::{ScenarioSpec, StepSpec};
use crate::fixture::{scoped, SessionFactory};
use crate::reporter::{RunSummary, ScenarioResult, StepResult};
use crate::result::{E2eError, FailureKind};
use crate::session::Session;
use crate::steps::StepRegistry;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A step that cannot be dispatched
#[derive(Debug)]
pub struct StepIssue {
    /// Scenario name
    pub scenario: String,
    /// `path:line` of the scenario
    pub location: String,
    /// The step as written
    pub step: String,
    /// Undefined or ambiguous step error
    pub error: E2eError,
}

impl std::fmt::Display for StepIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.scenario, self.location, self.error)
    }
}

/// Runs scenarios against sessions from a factory
pub struct ScenarioRunner {
    registry: Arc<StepRegistry>,
    factory: Box<dyn SessionFactory>,
    config: SessionConfig,
    name_filter: Option<String>,
    tags: Vec<String>,
    fail_fast: bool,
    artifacts_dir: Option<PathBuf>,
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("steps", &self.registry.len())
            .field("factory", &self.factory.name())
            .field("name_filter", &self.name_filter)
            .field("tags", &self.tags)
            .field("fail_fast", &self.fail_fast)
            .field("artifacts_dir", &self.artifacts_dir)
            .finish_non_exhaustive()
    }
}

impl ScenarioRunner {
    /// Create a runner
    #[must_use]
    pub fn new(
        registry: StepRegistry,
        factory: impl SessionFactory + 'static,
        config: SessionConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            factory: Box::new(factory),
            config,
            name_filter: None,
            tags: Vec::new(),
            fail_fast: false,
            artifacts_dir: None,
        }
    }

    /// Only run scenarios whose name contains `filter`
    #[must_use]
    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        self.name_filter = Some(filter.into());
        self
    }

    /// Only run scenarios carrying every tag; a `~` prefix excludes the tag
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Stop starting new scenarios after the first failure
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Save a screenshot of the failing page under `dir`
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Registry used for dispatch
    #[must_use]
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Scenarios that pass the name and tag filters, in order
    #[must_use]
    pub fn select<'s>(&self, scenarios: &'s [ScenarioSpec]) -> Vec<&'s ScenarioSpec> {
        scenarios.iter().filter(|s| self.selects(s)).collect()
    }

    fn selects(&self, scenario: &ScenarioSpec) -> bool {
        if let Some(filter) = &self.name_filter {
            if !scenario.name.contains(filter.as_str()) {
                return false;
            }
        }
        self.tags.iter().all(|tag| match tag.strip_prefix('~') {
            Some(excluded) => !scenario.has_tag(excluded),
            None => scenario.has_tag(tag),
        })
    }

    /// Resolve every selected step without opening a browser
    #[must_use]
    pub fn check(&self, scenarios: &[ScenarioSpec]) -> Vec<StepIssue> {
        self.select(scenarios)
            .into_iter()
            .flat_map(|scenario| {
                scenario.steps.iter().filter_map(move |step| {
                    self.registry
                        .resolve(step.kind, &step.text)
                        .err()
                        .map(|error| StepIssue {
                            scenario: scenario.name.clone(),
                            location: scenario.location(),
                            step: step.to_string(),
                            error,
                        })
                })
            })
            .collect()
    }

    /// Run the selected scenarios
    pub async fn run(&self, scenarios: &[ScenarioSpec]) -> RunSummary {
        let start = Instant::now();
        let selected = self.select(scenarios);
        info!(
            selected = selected.len(),
            total = scenarios.len(),
            factory = self.factory.name(),
            "run started"
        );

        let mut summary = RunSummary::default();
        for (index, scenario) in selected.iter().enumerate() {
            let result = self.run_scenario(index, scenario).await;
            let failed = result.status().is_failed();
            summary.scenarios.push(result);

            if failed && self.fail_fast {
                summary.not_run = selected.len() - index - 1;
                if summary.not_run > 0 {
                    info!(not_run = summary.not_run, "stopping after first failure");
                }
                break;
            }
        }

        summary.duration = start.elapsed();
        info!(
            passed = summary.passed_count(),
            failed = summary.failed_count(),
            skipped = summary.skipped_count(),
            "run finished"
        );
        summary
    }

    /// Run one scenario in a fresh session
    pub async fn run_scenario(&self, index: usize, scenario: &ScenarioSpec) -> ScenarioResult {
        let start = Instant::now();
        let mut result = ScenarioResult::new(
            scenario.feature.clone(),
            scenario.name.clone(),
            scenario.location(),
        );
        info!(scenario = %scenario.name, location = %result.location, "scenario started");

        let registry = Arc::clone(&self.registry);
        let steps = scenario.steps.clone();
        let screenshot_path = self
            .artifacts_dir
            .as_ref()
            .map(|dir| dir.join(screenshot_name(index, scenario)));

        let outcome = scoped(self.factory.as_ref(), &self.config, move |session| {
            async move { execute(&registry, &steps, session, screenshot_path.as_deref()).await }
                .boxed()
        })
        .await;

        match outcome {
            Ok(outcome) => {
                let (steps, screenshot) = outcome.value;
                result.steps = steps;
                result.screenshot = screenshot;
                if let Err(e) = outcome.teardown {
                    result.session_error = Some(e.to_string());
                }
            }
            Err(e) => {
                warn!(scenario = %scenario.name, error = %e, "session could not be opened");
                result.session_error = Some(e.to_string());
                result.steps = scenario
                    .steps
                    .iter()
                    .map(|s| StepResult::skipped(&s.keyword, &s.text))
                    .collect();
            }
        }

        result.duration = start.elapsed();
        info!(
            scenario = %scenario.name,
            status = ?result.status(),
            ms = u64::try_from(result.duration.as_millis()).unwrap_or(u64::MAX),
            "scenario finished"
        );
        result
    }
}

async fn execute(
    registry: &StepRegistry,
    steps: &[StepSpec],
    session: &Session,
    screenshot_path: Option<&Path>,
) -> (Vec<StepResult>, Option<PathBuf>) {
    let mut results = Vec::with_capacity(steps.len());
    let mut screenshot = None;
    let mut failed = false;

    for step in steps {
        if failed {
            results.push(StepResult::skipped(&step.keyword, &step.text));
            continue;
        }

        let start = Instant::now();
        let outcome = match registry.resolve(step.kind, &step.text) {
            Ok((binding, args)) => AssertUnwindSafe(binding.run(session, &args))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(E2eError::assertion(panic_message(&*panic)))),
            Err(e) => Err(e),
        };
        let elapsed = start.elapsed();

        match outcome {
            Ok(()) => {
                debug!(step = %step, "step passed");
                results.push(StepResult::passed(&step.keyword, &step.text, elapsed));
            }
            Err(e) => {
                let kind = e.kind();
                warn!(step = %step, kind = %kind, error = %e, "step failed");
                failed = true;
                if let Some(path) = screenshot_path {
                    if kind != FailureKind::Configuration {
                        screenshot = save_screenshot(session, path).await;
                    }
                }
                results.push(StepResult::failed(
                    &step.keyword,
                    &step.text,
                    elapsed,
                    kind,
                    e.to_string(),
                ));
            }
        }
    }

    (results, screenshot)
}

async fn save_screenshot(session: &Session, path: &Path) -> Option<PathBuf> {
    let saved = async {
        let bytes = session.screenshot().await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok::<_, E2eError>(())
    }
    .await;

    match saved {
        Ok(()) => {
            info!(path = %path.display(), "screenshot saved");
            Some(path.to_path_buf())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "screenshot failed");
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string payload".to_string());
    format!("step panicked: {detail}")
}

/// `003-add-a-room.png` style file name
fn screenshot_name(index: usize, scenario: &ScenarioSpec) -> String {
    let mut slug = String::new();
    for c in scenario.name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    format!("{:03}-{}.png", index + 1, slug.trim_matches('-'))
}
