//! Reporter - per-scenario and per-step results.
//!
//! A scenario fails at its first failing step; every later step is recorded
//! as skipped so the report always shows the whole scenario.

use crate::config::serialize_millis;
use crate::result::FailureKind;
use console::Style;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

/// Step result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step passed
    Passed,
    /// Step failed
    Failed,
    /// Step was not run
    Skipped,
}

impl StepStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// Keyword as written
    pub keyword: String,
    /// Step text
    pub text: String,
    /// Status
    pub status: StepStatus,
    /// Time spent in the handler
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Failure message
    pub error: Option<String>,
    /// Failure classification
    #[serde(skip)]
    pub kind: Option<FailureKind>,
}

impl StepResult {
    /// Create a passing step result
    #[must_use]
    pub fn passed(keyword: impl Into<String>, text: impl Into<String>, duration: Duration) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
            status: StepStatus::Passed,
            duration,
            error: None,
            kind: None,
        }
    }

    /// Create a failing step result
    #[must_use]
    pub fn failed(
        keyword: impl Into<String>,
        text: impl Into<String>,
        duration: Duration,
        kind: FailureKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
            status: StepStatus::Failed,
            duration,
            error: Some(error.into()),
            kind: Some(kind),
        }
    }

    /// Create a skipped step result
    #[must_use]
    pub fn skipped(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
            status: StepStatus::Skipped,
            duration: Duration::ZERO,
            error: None,
            kind: None,
        }
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Feature name
    pub feature: String,
    /// Scenario name
    pub name: String,
    /// `path:line`
    pub location: String,
    /// Step results in order
    pub steps: Vec<StepResult>,
    /// Session could not be opened or closed
    pub session_error: Option<String>,
    /// Screenshot captured at the failing step
    pub screenshot: Option<PathBuf>,
    /// Wall time including session setup and teardown
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create an empty result
    #[must_use]
    pub fn new(feature: impl Into<String>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            name: name.into(),
            location: location.into(),
            steps: Vec::new(),
            session_error: None,
            screenshot: None,
            duration: Duration::ZERO,
        }
    }

    /// Failed if any step failed or the session broke
    #[must_use]
    pub fn status(&self) -> StepStatus {
        if self.session_error.is_some() || self.steps.iter().any(|s| s.status.is_failed()) {
            StepStatus::Failed
        } else if !self.steps.is_empty() && self.steps.iter().all(|s| s.status == StepStatus::Skipped) {
            StepStatus::Skipped
        } else {
            StepStatus::Passed
        }
    }

    /// The failing step, if any
    #[must_use]
    pub fn failed_step(&self) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.status.is_failed())
    }

    /// Failure message: failing step first, then session error
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        self.failed_step()
            .and_then(|s| s.error.clone())
            .or_else(|| self.session_error.clone())
    }
}

/// Outcome of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Results in execution order
    pub scenarios: Vec<ScenarioResult>,
    /// Scenarios not started because the run stopped early
    pub not_run: usize,
    /// Total wall time
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl RunSummary {
    /// Get passed scenario count
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(StepStatus::Passed)
    }

    /// Get failed scenario count
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(StepStatus::Failed)
    }

    /// Get skipped scenario count, including those never started
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(StepStatus::Skipped) + self.not_run
    }

    /// Get total scenario count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.scenarios.len() + self.not_run
    }

    /// No scenario failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.scenarios
            .iter()
            .filter(|s| s.status().is_failed())
            .collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} scenarios: {} passed, {} failed, {} skipped ({:.2}s)",
            self.total_count(),
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.duration.as_secs_f64()
        )
    }

    fn count(&self, status: StepStatus) -> usize {
        self.scenarios.iter().filter(|s| s.status() == status).count()
    }
}

/// Render a run as indented text, optionally with ANSI colour
#[must_use]
pub fn render_text(summary: &RunSummary, color: bool) -> String {
    let green = Style::new().green().force_styling(color);
    let red = Style::new().red().force_styling(color);
    let dim = Style::new().dim().force_styling(color);
    let bold = Style::new().bold().force_styling(color);

    let mut out = String::new();
    let mut feature: Option<&str> = None;

    for scenario in &summary.scenarios {
        if feature != Some(scenario.feature.as_str()) {
            let _ = writeln!(out, "{}", bold.apply_to(format!("Feature: {}", scenario.feature)));
            feature = Some(scenario.feature.as_str());
        }

        let marker = match scenario.status() {
            StepStatus::Passed => green.apply_to("✓"),
            StepStatus::Failed => red.apply_to("✗"),
            StepStatus::Skipped => dim.apply_to("-"),
        };
        let _ = writeln!(
            out,
            "  {marker} Scenario: {} {}",
            scenario.name,
            dim.apply_to(format!("# {}", scenario.location))
        );

        for step in &scenario.steps {
            let line = format!("{} {}", step.keyword, step.text);
            let styled = match step.status {
                StepStatus::Passed => green.apply_to(line),
                StepStatus::Failed => red.apply_to(line),
                StepStatus::Skipped => dim.apply_to(line),
            };
            let _ = writeln!(out, "      {styled}");
            if let (Some(error), Some(kind)) = (&step.error, step.kind) {
                let _ = writeln!(out, "        {}", red.apply_to(format!("[{kind}] {error}")));
            }
        }

        if let Some(error) = &scenario.session_error {
            let _ = writeln!(out, "      {}", red.apply_to(format!("session: {error}")));
        }
        if let Some(shot) = &scenario.screenshot {
            let _ = writeln!(out, "      {}", dim.apply_to(format!("screenshot: {}", shot.display())));
        }
    }

    if summary.not_run > 0 {
        let _ = writeln!(
            out,
            "{}",
            dim.apply_to(format!("{} scenario(s) not run after failure", summary.not_run))
        );
    }

    let line = summary.summary();
    let _ = writeln!(
        out,
        "\n{}",
        if summary.all_passed() {
            green.apply_to(line)
        } else {
            red.apply_to(line)
        }
    );
    out
}
