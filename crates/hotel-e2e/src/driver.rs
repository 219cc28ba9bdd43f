//! Driver - abstract browser automation trait
//!
//! Every browser interaction goes through [`Driver`], so the same page
//! helpers run against a real Chromium (`ChromiumDriver`, behind the
//! `browser` feature) or against the in-memory [`crate::mock::MockDriver`].
//!
//! Elements are addressed by `(locator, index)` rather than by a retained
//! node handle. A query returns [`ElementState`] snapshots; an action
//! re-resolves the locator and fails with `StaleElement` if the match has
//! disappeared in between.

use crate::config::Viewport;
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Snapshot of one DOM element at query time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementState {
    /// Lower-case tag name
    pub tag: String,
    /// Rendered text (`innerText`)
    pub text: String,
    /// Inner markup (`innerHTML`)
    pub html: String,
    /// Form value for inputs and selects
    pub value: Option<String>,
    /// Rendered with a non-empty box and not hidden by style
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
}

impl ElementState {
    /// Create a visible, enabled element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            visible: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Set the rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the inner markup
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Set the form value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set enabled state
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Visible and enabled
    #[must_use]
    pub const fn is_clickable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// A located element: where it was found and what it looked like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Locator that resolved it
    pub locator: Locator,
    /// Position among the locator's matches
    pub index: usize,
    /// State at the time it was located
    pub state: ElementState,
}

impl Element {
    /// Create a located element
    #[must_use]
    pub const fn new(locator: Locator, index: usize, state: ElementState) -> Self {
        Self {
            locator,
            index,
            state,
        }
    }

    /// Rendered text, trimmed
    #[must_use]
    pub fn text(&self) -> &str {
        self.state.text.trim()
    }

    /// Inner markup
    #[must_use]
    pub fn html(&self) -> &str {
        &self.state.html
    }

    /// Whether the element was visible when located
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.state.visible
    }
}

/// Abstract driver trait for browser automation
///
/// One driver owns one page. Implementations must tolerate being called
/// with an index that no longer matches and report it as
/// `E2eError::StaleElement`.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to URL and wait for the load event
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Current `document.title`
    async fn title(&self) -> E2eResult<String>;

    /// Snapshot every element matching the locator, in document order
    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementState>>;

    /// Click the `index`th match
    async fn click(&self, locator: &Locator, index: usize) -> E2eResult<()>;

    /// Clear the value of the `index`th match
    async fn clear(&self, locator: &Locator, index: usize) -> E2eResult<()>;

    /// Type text into the `index`th match.
    ///
    /// For a `<select>` this picks the first option whose label or value
    /// starts with the typed text, the way keyboard selection does.
    async fn send_keys(&self, locator: &Locator, index: usize, text: &str) -> E2eResult<()>;

    /// Resize the page viewport
    async fn set_viewport(&self, viewport: Viewport) -> E2eResult<()>;

    /// Capture the page as PNG bytes
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    /// Release the page and its browser connection
    async fn close(&self) -> E2eResult<()>;

    /// Name used in logs
    fn name(&self) -> &str {
        "driver"
    }
}

/// Close a driver that failed during setup and hand back the setup error.
///
/// A close error is logged; the setup error is what the caller reports.
pub async fn discard(driver: &dyn Driver, error: E2eError) -> E2eError {
    if let Err(close_err) = driver.close().await {
        tracing::warn!(driver = driver.name(), error = %close_err, "closing after failed setup");
    }
    error
}
