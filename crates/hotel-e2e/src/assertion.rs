//! Assertions for page checks.
//!
//! Helpers build an [`AssertionResult`]; `into_result` turns a failing one
//! into `E2eError::AssertionFailed` so page helpers can use `?`.

use crate::result::{E2eError, E2eResult};
use regex::Regex;
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Prefix the failure message with what was being checked
    #[must_use]
    pub fn context(mut self, subject: &str) -> Self {
        if !self.passed {
            self.message = format!("{subject}: {}", self.message);
        }
        self
    }

    /// Convert into a result
    pub fn into_result(self) -> E2eResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(E2eError::assertion(self.message))
        }
    }
}

/// Assertion helpers
#[derive(Debug)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert a string does not contain a substring
    #[must_use]
    pub fn not_contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::fail(format!("expected '{haystack}' not to contain '{needle}'"))
        } else {
            AssertionResult::pass()
        }
    }

    /// Assert a string matches a regular expression
    #[must_use]
    pub fn matches(pattern: &Regex, text: &str) -> AssertionResult {
        if pattern.is_match(text) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{text}' to match /{pattern}/"))
        }
    }

    /// Assert condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }
}
