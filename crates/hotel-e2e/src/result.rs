//! Result and error types for the hotel suite.

use thiserror::Error;

/// Result type for suite operations
pub type E2eResult<T> = Result<T, E2eError>;

/// How a failure should be read in a scenario report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A wait condition did not hold within its timeout
    Timeout,
    /// An observed value did not match the expected value or pattern
    Assertion,
    /// The session, the environment or the step library is misconfigured
    Configuration,
    /// The browser rejected a command (navigation, script, stale element)
    Interaction,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Assertion => "assertion",
            Self::Configuration => "configuration",
            Self::Interaction => "interaction",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while running scenarios
#[derive(Debug, Error)]
pub enum E2eError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Connection to a remote browser endpoint failed
    #[error("Failed to connect to browser at {endpoint}: {message}")]
    ConnectionFailed {
        /// Endpoint that was dialled
        endpoint: String,
        /// Error message
        message: String,
    },

    /// The browser feature is not compiled in
    #[error("Browser support not enabled. Rebuild with the 'browser' feature")]
    BrowserUnavailable,

    /// No base URL was configured for navigation
    #[error("No base URL configured. Set BASE_URL or pass --base-url")]
    MissingBaseUrl,

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Script evaluation in the page failed
    #[error("Script evaluation failed: {message}")]
    ScriptError {
        /// Error message
        message: String,
    },

    /// A previously located element is no longer in the page
    #[error("Element {locator} (match #{index}) is no longer attached to the page")]
    StaleElement {
        /// Locator description
        locator: String,
        /// Match index at the time it was located
        index: usize,
    },

    /// A wait condition did not hold in time
    #[error("Timed out after {ms}ms waiting for {condition}{}", .last_error.as_ref().map(|e| format!(" (last error: {e})")).unwrap_or_default())]
    Timeout {
        /// Condition that was waited for
        condition: String,
        /// Timeout in milliseconds
        ms: u64,
        /// Last transient error seen while polling
        last_error: Option<String>,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// No binding matches the step text
    #[error("Undefined step: {keyword} {text}")]
    UndefinedStep {
        /// Step keyword (Given/When/Then)
        keyword: String,
        /// Step text
        text: String,
    },

    /// More than one binding matches the step text
    #[error("Ambiguous step: {keyword} {text} matches {}", .patterns.join(" | "))]
    AmbiguousStep {
        /// Step keyword (Given/When/Then)
        keyword: String,
        /// Step text
        text: String,
        /// Every pattern that matched
        patterns: Vec<String>,
    },

    /// The same binding was registered twice
    #[error("Duplicate step binding: {keyword} {pattern}")]
    DuplicateStep {
        /// Step keyword (Given/When/Then)
        keyword: String,
        /// Pattern template
        pattern: String,
    },

    /// A step pattern template could not be compiled
    #[error("Invalid step pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern template
        pattern: String,
        /// Error message
        message: String,
    },

    /// A handler asked for a parameter its pattern does not capture
    #[error("Step parameter '{name}' was not captured")]
    MissingArgument {
        /// Parameter name or position
        name: String,
    },

    /// A feature file could not be parsed
    #[error("Failed to parse feature {path}: {message}")]
    FeatureParse {
        /// Feature file path
        path: String,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl E2eError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a script evaluation error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::ScriptError {
            message: message.into(),
        }
    }

    /// Classify the error for reporting
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::AssertionFailed { .. } => FailureKind::Assertion,
            Self::NavigationError { .. } | Self::ScriptError { .. } | Self::StaleElement { .. } => {
                FailureKind::Interaction
            }
            Self::BrowserLaunchError { .. }
            | Self::ConnectionFailed { .. }
            | Self::BrowserUnavailable
            | Self::MissingBaseUrl
            | Self::Config { .. }
            | Self::UndefinedStep { .. }
            | Self::AmbiguousStep { .. }
            | Self::DuplicateStep { .. }
            | Self::InvalidPattern { .. }
            | Self::MissingArgument { .. }
            | Self::FeatureParse { .. }
            | Self::Io(_) => FailureKind::Configuration,
        }
    }

    /// Whether a wait loop may keep polling after this error.
    ///
    /// Script evaluation fails while a navigation tears down the execution
    /// context; the next poll runs against the new document.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ScriptError { .. })
    }
}
