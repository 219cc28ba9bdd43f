//! Feature files: discovery, parsing and flattening into runnable scenarios.
//!
//! Backgrounds are prepended to every scenario they cover, rule scenarios
//! are flattened in file order, and each example row of a Scenario Outline
//! becomes its own scenario with `<column>` placeholders substituted.

use crate::result::{E2eError, E2eResult};
use crate::steps::StepKind;
use gherkin::{Feature, GherkinEnv, Scenario, Step, StepType};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One step ready to be dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSpec {
    /// Keyword as written (`Given`, `And`, `But`, ...)
    pub keyword: String,
    /// Resolved kind; `And`/`But` inherit the previous step's kind
    pub kind: StepKind,
    /// Step text after the keyword
    pub text: String,
}

impl std::fmt::Display for StepSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.keyword, self.text)
    }
}

/// One runnable scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSpec {
    /// Feature name
    pub feature: String,
    /// Scenario name (outline rows get an example suffix)
    pub name: String,
    /// Feature, rule, scenario and example tags, without `@`
    pub tags: Vec<String>,
    /// Background steps followed by scenario steps
    pub steps: Vec<StepSpec>,
    /// Source file, if loaded from disk
    pub path: Option<PathBuf>,
    /// Line of the scenario keyword
    pub line: usize,
}

impl ScenarioSpec {
    /// Whether the scenario carries a tag (with or without `@`)
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim_start_matches('@');
        self.tags.iter().any(|t| t == tag)
    }

    /// `path:line` or the feature name
    #[must_use]
    pub fn location(&self) -> String {
        self.path.as_ref().map_or_else(
            || format!("{}:{}", self.feature, self.line),
            |p| format!("{}:{}", p.display(), self.line),
        )
    }
}

// =============================================================================
// DISCOVERY
// =============================================================================

/// Every `.feature` file under the given files and directories, sorted
pub fn discover(paths: &[PathBuf]) -> E2eResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let pattern = path.join("**").join("*.feature");
            let pattern = pattern.to_string_lossy();
            let entries = glob::glob(&pattern).map_err(|e| E2eError::config(e.to_string()))?;
            for entry in entries {
                files.push(entry.map_err(|e| E2eError::Io(e.into_error()))?);
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(E2eError::config(format!(
                "feature path {} does not exist",
                path.display()
            )));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Discover and parse every feature under the paths
pub fn load_features(paths: &[PathBuf]) -> E2eResult<Vec<ScenarioSpec>> {
    let mut scenarios = Vec::new();
    for file in discover(paths)? {
        scenarios.extend(parse_file(&file)?);
    }
    tracing::debug!(count = scenarios.len(), "scenarios loaded");
    Ok(scenarios)
}

/// Parse one feature file
pub fn parse_file(path: &Path) -> E2eResult<Vec<ScenarioSpec>> {
    let feature =
        Feature::parse_path(path, GherkinEnv::default()).map_err(|e| E2eError::FeatureParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(flatten(&feature, Some(path)))
}

/// Parse feature source text
pub fn parse_str(source: &str) -> E2eResult<Vec<ScenarioSpec>> {
    let feature =
        Feature::parse(source, GherkinEnv::default()).map_err(|e| E2eError::FeatureParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
    Ok(flatten(&feature, None))
}

// =============================================================================
// FLATTENING
// =============================================================================

fn strip_tags(tags: &[String]) -> impl Iterator<Item = String> + '_ {
    tags.iter().map(|t| t.trim_start_matches('@').to_string())
}

fn kind_of(ty: &StepType) -> StepKind {
    match ty {
        StepType::Given => StepKind::Given,
        StepType::When => StepKind::When,
        StepType::Then => StepKind::Then,
    }
}

fn step_specs(steps: &[Step], substitute: &dyn Fn(&str) -> String) -> Vec<StepSpec> {
    steps
        .iter()
        .map(|s| StepSpec {
            keyword: s.keyword.trim().to_string(),
            kind: kind_of(&s.ty),
            text: substitute(s.value.trim()),
        })
        .collect()
}

fn flatten(feature: &Feature, path: Option<&Path>) -> Vec<ScenarioSpec> {
    let feature_tags: Vec<String> = strip_tags(&feature.tags).collect();
    let feature_background = feature.background.as_ref().map(|b| b.steps.as_slice()).unwrap_or_default();

    let mut out = Vec::new();
    for scenario in &feature.scenarios {
        expand(feature, path, &feature_tags, &[feature_background], scenario, &mut out);
    }
    for rule in &feature.rules {
        let mut tags = feature_tags.clone();
        tags.extend(strip_tags(&rule.tags));
        let rule_background = rule.background.as_ref().map(|b| b.steps.as_slice()).unwrap_or_default();
        for scenario in &rule.scenarios {
            expand(
                feature,
                path,
                &tags,
                &[feature_background, rule_background],
                scenario,
                &mut out,
            );
        }
    }
    out
}

fn expand(
    feature: &Feature,
    path: Option<&Path>,
    inherited_tags: &[String],
    backgrounds: &[&[Step]],
    scenario: &Scenario,
    out: &mut Vec<ScenarioSpec>,
) {
    let mut tags = inherited_tags.to_vec();
    tags.extend(strip_tags(&scenario.tags));

    let build = |name: String, tags: Vec<String>, substitute: &dyn Fn(&str) -> String| {
        let mut steps: Vec<StepSpec> = backgrounds
            .iter()
            .flat_map(|bg| step_specs(bg, &|s: &str| s.to_string()))
            .collect();
        steps.extend(step_specs(&scenario.steps, substitute));
        ScenarioSpec {
            feature: feature.name.clone(),
            name,
            tags,
            steps,
            path: path.map(Path::to_path_buf),
            line: scenario.position.line,
        }
    };

    let rows: Vec<(Vec<String>, Vec<String>, Vec<String>)> = scenario
        .examples
        .iter()
        .filter_map(|ex| ex.table.as_ref().map(|t| (ex, t)))
        .flat_map(|(ex, table)| {
            let header = table.rows.first().cloned().unwrap_or_default();
            let ex_tags: Vec<String> = strip_tags(&ex.tags).collect();
            table
                .rows
                .iter()
                .skip(1)
                .map(move |row| (header.clone(), row.clone(), ex_tags.clone()))
        })
        .collect();

    if rows.is_empty() {
        out.push(build(scenario.name.clone(), tags, &|s: &str| s.to_string()));
        return;
    }

    for (n, (header, row, ex_tags)) in rows.into_iter().enumerate() {
        let substitute = move |text: &str| {
            header
                .iter()
                .zip(&row)
                .fold(text.to_string(), |acc, (col, val)| acc.replace(&format!("<{col}>"), val))
        };
        let mut row_tags = tags.clone();
        row_tags.extend(ex_tags);
        let name = format!("{} (example {})", substitute(&scenario.name), n + 1);
        out.push(build(name, row_tags, &substitute));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const FEATURE: &str = r#"@hotel
Feature: Hotel management

  Background:
    Given I am on the homepage

  Scenario: Verify homepage
    Then I should see the page title "AWS App Runner Hotel"
    And I should see a navbar with "Home", "Rooms", and "Add" options

  @add
  Scenario Outline: Add a room
    When I click on "Add" in the navbar
    And I enter "<room>" in the "Room number" field
    Then the new room should be added successfully

    Examples:
      | room |
      | 101  |
      | 102  |
"#;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_background_is_prepended() {
            let scenarios = parse_str(FEATURE).unwrap();
            let first = &scenarios[0];
            assert_eq!(first.feature, "Hotel management");
            assert_eq!(first.name, "Verify homepage");
            assert_eq!(first.steps.len(), 3);
            assert_eq!(first.steps[0].text, "I am on the homepage");
            assert_eq!(first.steps[0].kind, StepKind::Given);
        }

        #[test]
        fn test_and_inherits_kind() {
            let scenarios = parse_str(FEATURE).unwrap();
            let step = &scenarios[0].steps[2];
            assert_eq!(step.keyword, "And");
            assert_eq!(step.kind, StepKind::Then);
            assert_eq!(step.to_string(), "And I should see a navbar with \"Home\", \"Rooms\", and \"Add\" options");
        }

        #[test]
        fn test_outline_expands_rows() {
            let scenarios = parse_str(FEATURE).unwrap();
            assert_eq!(scenarios.len(), 3);
            assert_eq!(scenarios[1].name, "Add a room (example 1)");
            assert_eq!(scenarios[2].steps[2].text, "I enter \"102\" in the \"Room number\" field");
        }

        #[test]
        fn test_tags_are_inherited_without_at() {
            let scenarios = parse_str(FEATURE).unwrap();
            assert!(scenarios[0].has_tag("hotel"));
            assert!(!scenarios[0].has_tag("add"));
            assert!(scenarios[1].has_tag("@add"));
            assert!(scenarios[1].has_tag("hotel"));
        }

        #[test]
        fn test_parse_error_is_reported() {
            let err = parse_str("this is not gherkin").unwrap_err();
            assert!(matches!(err, E2eError::FeatureParse { .. }));
        }
    }

    mod discovery_tests {
        use super::*;

        #[test]
        fn test_discovers_nested_features_sorted() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir(dir.path().join("nested")).unwrap();
            std::fs::write(dir.path().join("b.feature"), FEATURE).unwrap();
            std::fs::write(dir.path().join("nested").join("a.feature"), FEATURE).unwrap();
            std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

            let files = discover(&[dir.path().to_path_buf()]).unwrap();
            assert_eq!(files.len(), 2);
            assert!(files[0].ends_with("b.feature"));
            assert!(files[1].ends_with("nested/a.feature"));

            let scenarios = load_features(&[dir.path().to_path_buf()]).unwrap();
            assert_eq!(scenarios.len(), 6);
            assert!(scenarios[0].location().contains("b.feature:"));
        }

        #[test]
        fn test_missing_path_is_configuration_error() {
            let err = discover(&[PathBuf::from("/definitely/not/here")]).unwrap_err();
            assert_eq!(err.kind(), crate::FailureKind::Configuration);
        }
    }
}
