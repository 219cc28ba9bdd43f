//! Step bindings: map Gherkin step text to async handlers.
//!
//! A pattern is the literal step text with `{name}` placeholders. Every
//! placeholder captures the shortest text that lets the whole line match,
//! and is handed to the handler as a string. A registry holds at most one
//! binding per keyword and template, and resolving a step must find exactly
//! one match.

pub mod hotel;

use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use futures::future::BoxFuture;
use regex::Regex;
use serde::Serialize;

pub use hotel::hotel_steps;

/// Step keyword a binding answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StepKind {
    /// Precondition
    Given,
    /// Action
    When,
    /// Outcome
    Then,
}

impl StepKind {
    /// Keyword as written in a feature file
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PATTERNS
// =============================================================================

/// A compiled step template such as `I enter "{room_number}" in the "Room number" field`
#[derive(Debug, Clone)]
pub struct StepPattern {
    template: String,
    names: Vec<String>,
    regex: Regex,
}

impl StepPattern {
    /// Compile a template
    pub fn parse(template: &str) -> E2eResult<Self> {
        let invalid = |message: String| E2eError::InvalidPattern {
            pattern: template.to_string(),
            message,
        };

        let mut source = String::from("^");
        let mut names = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            source.push_str(&regex::escape(&rest[..open]));
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| invalid("unclosed '{'".to_string()))?;
            let name = &after[..close];
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid(format!("bad placeholder name '{name}'")));
            }
            if names.iter().any(|n| n == name) {
                return Err(invalid(format!("placeholder '{name}' used twice")));
            }
            source.push_str(&format!("(?P<{name}>.*?)"));
            names.push(name.to_string());
            rest = &after[close + 1..];
        }
        source.push_str(&regex::escape(rest));
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            template: template.to_string(),
            names,
            regex,
        })
    }

    /// Template as written
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Match step text, returning the captured arguments
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<StepArgs> {
        let caps = self.regex.captures(text.trim())?;
        let values = self
            .names
            .iter()
            .map(|name| {
                let value = caps.name(name).map_or("", |m| m.as_str());
                (name.clone(), value.to_string())
            })
            .collect();
        Some(StepArgs { values })
    }
}

/// Arguments captured from step text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepArgs {
    values: Vec<(String, String)>,
}

impl StepArgs {
    /// Argument by placeholder name
    pub fn get(&self, name: &str) -> E2eResult<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| E2eError::MissingArgument {
                name: name.to_string(),
            })
    }

    /// Argument by position
    pub fn positional(&self, index: usize) -> E2eResult<&str> {
        self.values
            .get(index)
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| E2eError::MissingArgument {
                name: format!("#{index}"),
            })
    }

    /// Number of arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No arguments captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Async step handler
pub type StepFn = for<'a> fn(&'a Session, &'a StepArgs) -> BoxFuture<'a, E2eResult<()>>;

/// One registered binding
#[derive(Clone)]
pub struct StepBinding {
    kind: StepKind,
    pattern: StepPattern,
    handler: StepFn,
}

impl std::fmt::Debug for StepBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepBinding")
            .field("kind", &self.kind)
            .field("template", &self.pattern.template())
            .finish_non_exhaustive()
    }
}

impl StepBinding {
    /// Keyword
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        self.kind
    }

    /// Pattern
    #[must_use]
    pub const fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// Run the handler
    pub async fn run(&self, session: &Session, args: &StepArgs) -> E2eResult<()> {
        (self.handler)(session, args).await
    }
}

/// Set of step bindings
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    bindings: Vec<StepBinding>,
}

impl StepRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding; the same keyword and template may appear only once
    pub fn register(&mut self, kind: StepKind, template: &str, handler: StepFn) -> E2eResult<()> {
        if self
            .bindings
            .iter()
            .any(|b| b.kind == kind && b.pattern.template() == template)
        {
            return Err(E2eError::DuplicateStep {
                keyword: kind.to_string(),
                pattern: template.to_string(),
            });
        }
        let pattern = StepPattern::parse(template)?;
        self.bindings.push(StepBinding {
            kind,
            pattern,
            handler,
        });
        Ok(())
    }

    /// Register a Given binding
    pub fn given(&mut self, template: &str, handler: StepFn) -> E2eResult<()> {
        self.register(StepKind::Given, template, handler)
    }

    /// Register a When binding
    pub fn when(&mut self, template: &str, handler: StepFn) -> E2eResult<()> {
        self.register(StepKind::When, template, handler)
    }

    /// Register a Then binding
    pub fn then(&mut self, template: &str, handler: StepFn) -> E2eResult<()> {
        self.register(StepKind::Then, template, handler)
    }

    /// Find the single binding for a step
    pub fn resolve(&self, kind: StepKind, text: &str) -> E2eResult<(&StepBinding, StepArgs)> {
        let mut matches: Vec<(&StepBinding, StepArgs)> = self
            .bindings
            .iter()
            .filter(|b| b.kind == kind)
            .filter_map(|b| b.pattern.captures(text).map(|args| (b, args)))
            .collect();

        match matches.len() {
            0 => Err(E2eError::UndefinedStep {
                keyword: kind.to_string(),
                text: text.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(E2eError::AmbiguousStep {
                keyword: kind.to_string(),
                text: text.to_string(),
                patterns: matches
                    .iter()
                    .map(|(b, _)| b.pattern.template().to_string())
                    .collect(),
            }),
        }
    }

    /// Every binding in registration order
    #[must_use]
    pub fn bindings(&self) -> &[StepBinding] {
        &self.bindings
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// No bindings registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
