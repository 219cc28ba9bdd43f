//! Terminal output

use console::{style, Term};
use hotel_e2e::{render_text, RunSummary, StepIssue, StepRegistry};
use serde::Serialize;
use std::fmt::Write as _;

/// Writes results to the terminal
#[derive(Debug)]
pub struct Output {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Output {
    /// Create an output writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Print a line unless quiet
    pub fn line(&self, text: &str) {
        if !self.quiet {
            let _ = self.term.write_line(text);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a value as pretty JSON
    pub fn json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        let text = serde_json::to_string_pretty(value)?;
        let _ = self.term.write_line(&text);
        Ok(())
    }

    /// Print a run report; quiet mode keeps only the failures
    pub fn summary(&self, summary: &RunSummary) {
        if self.quiet {
            for failure in summary.failures() {
                self.failure(&format!(
                    "{} ({}): {}",
                    failure.name,
                    failure.location,
                    failure.failure_message().unwrap_or_default()
                ));
            }
            return;
        }
        let _ = self.term.write_str(&render_text(summary, self.use_color));
    }

    /// Print unresolved steps
    pub fn issues(&self, issues: &[StepIssue]) {
        for issue in issues {
            self.failure(&format!("{}\n      {}", issue.location, issue.error));
        }
    }
}

/// Step library as text, one binding per line
#[must_use]
pub fn render_steps(registry: &StepRegistry) -> String {
    let mut out = String::new();
    for binding in registry.bindings() {
        let _ = writeln!(out, "{:<5} {}", binding.kind().as_str(), binding.pattern().template());
    }
    out
}

/// One binding, for JSON output
#[derive(Debug, Serialize)]
pub struct StepEntry<'a> {
    /// Given/When/Then
    pub kind: hotel_e2e::StepKind,
    /// Pattern template
    pub pattern: &'a str,
    /// Placeholder names
    pub parameters: &'a [String],
}

/// Step library as serializable entries
#[must_use]
pub fn step_entries(registry: &StepRegistry) -> Vec<StepEntry<'_>> {
    registry
        .bindings()
        .iter()
        .map(|b| StepEntry {
            kind: b.kind(),
            pattern: b.pattern().template(),
            parameters: b.pattern().names(),
        })
        .collect()
}
