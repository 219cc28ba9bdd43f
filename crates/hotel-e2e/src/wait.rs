//! Wait Mechanisms
//!
//! Explicit waits that poll the page until a condition holds.
//!
//! Every wait probes at least once, sleeps for the poll interval between
//! probes, and gives up with `E2eError::Timeout` once the timeout has
//! elapsed. Transient script errors (the page navigating mid-probe) are
//! remembered and polling continues; any other error ends the wait at once.
//! Time is measured with `tokio::time`, so paused-clock tests run instantly.

use crate::config::{SessionConfig, DEFAULT_IMPLICIT_WAIT_MS, DEFAULT_POLL_INTERVAL_MS};
use crate::driver::{Driver, Element, ElementState};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up after this long
    pub timeout: Duration,
    /// Sleep between probes
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_IMPLICIT_WAIT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take timeout and poll interval from a session config
    #[must_use]
    pub const fn from_config(config: &SessionConfig) -> Self {
        Self {
            timeout: config.implicit_wait,
            poll_interval: config.poll_interval,
        }
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// Something a wait can block on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// At least one element matches
    Present(Locator),
    /// At least one matching element is visible
    Visible(Locator),
    /// At least one element matches; yields all of them
    AllPresent(Locator),
    /// At least one element matches and every match is visible
    AllVisible(Locator),
    /// A matching element is visible and enabled
    Clickable(Locator),
    /// `document.title` equals the text exactly
    TitleIs(String),
    /// A matching element has non-blank rendered text
    TextNotEmpty(Locator),
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present(l) => write!(f, "element located by {l} to be present"),
            Self::Visible(l) => write!(f, "element located by {l} to be visible"),
            Self::AllPresent(l) => write!(f, "elements located by {l} to be present"),
            Self::AllVisible(l) => write!(f, "all elements located by {l} to be visible"),
            Self::Clickable(l) => write!(f, "element located by {l} to be clickable"),
            Self::TitleIs(t) => write!(f, "title to be '{t}'"),
            Self::TextNotEmpty(l) => write!(f, "element located by {l} to have text"),
        }
    }
}

/// What a satisfied condition produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Satisfied {
    /// A single element
    Element(Element),
    /// Every match, in document order
    Elements(Vec<Element>),
    /// The page title
    Title(String),
}

fn locate(locator: &Locator, states: Vec<ElementState>) -> Vec<Element> {
    states
        .into_iter()
        .enumerate()
        .map(|(index, state)| Element::new(locator.clone(), index, state))
        .collect()
}

fn first_where(
    locator: &Locator,
    states: Vec<ElementState>,
    pred: impl Fn(&ElementState) -> bool,
) -> Option<Element> {
    locate(locator, states).into_iter().find(|el| pred(&el.state))
}

// =============================================================================
// WAITER
// =============================================================================

/// Polls a driver until conditions hold
#[derive(Clone, Copy)]
pub struct Waiter<'a> {
    driver: &'a dyn Driver,
    options: WaitOptions,
}

impl std::fmt::Debug for Waiter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waiter")
            .field("driver", &self.driver.name())
            .field("options", &self.options)
            .finish()
    }
}

impl<'a> Waiter<'a> {
    /// Create a waiter over a driver
    #[must_use]
    pub fn new(driver: &'a dyn Driver, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// Same driver, different timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Poll `probe` until it yields `Some`.
    ///
    /// `description` names the condition in the timeout error.
    pub async fn until<T, F, Fut>(&self, description: &str, mut probe: F) -> E2eResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Option<T>>>,
    {
        let start = Instant::now();
        let deadline = start + self.options.timeout;
        let mut last_error: Option<String> = None;
        let mut polls = 0_u32;

        loop {
            polls += 1;
            match probe().await {
                Ok(Some(value)) => {
                    tracing::debug!(
                        condition = description,
                        polls,
                        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "wait satisfied"
                    );
                    return Ok(value);
                }
                Ok(None) => {}
                Err(err) if err.is_transient() => {
                    tracing::trace!(condition = description, error = %err, "transient error while waiting");
                    last_error = Some(err.to_string());
                }
                Err(err) => return Err(err),
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(condition = description, polls, "wait timed out");
                return Err(E2eError::Timeout {
                    condition: description.to_string(),
                    ms: self.options.timeout_ms(),
                    last_error,
                });
            }
            let remaining = deadline - now;
            tokio::time::sleep(self.options.poll_interval.min(remaining)).await;
        }
    }

    /// Wait for a condition
    pub async fn wait_for(&self, condition: &Condition) -> E2eResult<Satisfied> {
        let description = condition.to_string();
        let driver = self.driver;
        self.until(&description, || async move {
            let satisfied = match condition {
                Condition::Present(l) => {
                    first_where(l, driver.query(l).await?, |_| true).map(Satisfied::Element)
                }
                Condition::Visible(l) => {
                    first_where(l, driver.query(l).await?, |s| s.visible).map(Satisfied::Element)
                }
                Condition::Clickable(l) => first_where(l, driver.query(l).await?, ElementState::is_clickable)
                    .map(Satisfied::Element),
                Condition::TextNotEmpty(l) => {
                    first_where(l, driver.query(l).await?, |s| !s.text.trim().is_empty())
                        .map(Satisfied::Element)
                }
                Condition::AllPresent(l) => {
                    let all = locate(l, driver.query(l).await?);
                    (!all.is_empty()).then_some(Satisfied::Elements(all))
                }
                Condition::AllVisible(l) => {
                    let all = locate(l, driver.query(l).await?);
                    (!all.is_empty() && all.iter().all(Element::is_displayed))
                        .then_some(Satisfied::Elements(all))
                }
                Condition::TitleIs(expected) => {
                    let title = driver.title().await?;
                    (title == *expected).then_some(Satisfied::Title(title))
                }
            };
            Ok::<_, E2eError>(satisfied)
        })
        .await
    }

    /// Wait for an element to be present
    pub async fn present(&self, locator: &Locator) -> E2eResult<Element> {
        self.element(Condition::Present(locator.clone())).await
    }

    /// Wait for an element to be visible
    pub async fn visible(&self, locator: &Locator) -> E2eResult<Element> {
        self.element(Condition::Visible(locator.clone())).await
    }

    /// Wait for an element to be clickable
    pub async fn clickable(&self, locator: &Locator) -> E2eResult<Element> {
        self.element(Condition::Clickable(locator.clone())).await
    }

    /// Wait for an element with non-blank text
    pub async fn text_ready(&self, locator: &Locator) -> E2eResult<Element> {
        self.element(Condition::TextNotEmpty(locator.clone())).await
    }

    /// Wait for at least one match and return every match
    pub async fn all_present(&self, locator: &Locator) -> E2eResult<Vec<Element>> {
        self.elements(Condition::AllPresent(locator.clone())).await
    }

    /// Wait until every match is visible
    pub async fn all_visible(&self, locator: &Locator) -> E2eResult<Vec<Element>> {
        self.elements(Condition::AllVisible(locator.clone())).await
    }

    /// Wait for the page title to equal `title`
    pub async fn title_is(&self, title: &str) -> E2eResult<String> {
        match self.wait_for(&Condition::TitleIs(title.to_string())).await? {
            Satisfied::Title(t) => Ok(t),
            other => Err(unexpected(&other)),
        }
    }

    async fn element(&self, condition: Condition) -> E2eResult<Element> {
        match self.wait_for(&condition).await? {
            Satisfied::Element(el) => Ok(el),
            other => Err(unexpected(&other)),
        }
    }

    async fn elements(&self, condition: Condition) -> E2eResult<Vec<Element>> {
        match self.wait_for(&condition).await? {
            Satisfied::Elements(els) => Ok(els),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(satisfied: &Satisfied) -> E2eError {
    E2eError::config(format!("wait produced an unexpected result: {satisfied:?}"))
}
