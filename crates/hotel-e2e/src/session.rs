//! Browser session: one driver plus the config it was opened with.
//!
//! Page helpers and step handlers only ever see `&Session`. The session is
//! closed exactly once by whoever opened it, see [`crate::fixture`].

use crate::config::SessionConfig;
use crate::driver::{Driver, Element};
use crate::result::E2eResult;
use crate::wait::{WaitOptions, Waiter};
use std::time::Duration;

/// An open browser session
pub struct Session {
    config: SessionConfig,
    driver: Box<dyn Driver>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("driver", &self.driver.name())
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap an already-open driver and apply the configured viewport
    pub async fn open(config: SessionConfig, driver: Box<dyn Driver>) -> E2eResult<Self> {
        driver.set_viewport(config.viewport).await?;
        tracing::info!(
            driver = driver.name(),
            viewport = %config.viewport,
            base_url = config.base_url.as_deref().unwrap_or("-"),
            "session opened"
        );
        Ok(Self { config, driver })
    }

    /// Open a Chromium session for the config
    #[cfg(feature = "browser")]
    pub async fn launch(config: SessionConfig) -> E2eResult<Self> {
        let driver = crate::browser::ChromiumDriver::open(&config).await?;
        Self::open(config, Box::new(driver)).await
    }

    /// Browser support is not compiled in
    #[cfg(not(feature = "browser"))]
    pub async fn launch(config: SessionConfig) -> E2eResult<Self> {
        config.validate()?;
        Err(crate::E2eError::BrowserUnavailable)
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Configured base URL
    pub fn base_url(&self) -> E2eResult<String> {
        self.config.url_for("")
    }

    /// Navigate to a path under the base URL
    pub async fn goto(&self, path: &str) -> E2eResult<()> {
        let url = self.config.url_for(path)?;
        tracing::debug!(%url, "navigating");
        self.driver.goto(&url).await
    }

    /// Current page title
    pub async fn title(&self) -> E2eResult<String> {
        self.driver.title().await
    }

    /// Waiter using the session's implicit wait
    #[must_use]
    pub fn waiter(&self) -> Waiter<'_> {
        Waiter::new(self.driver.as_ref(), WaitOptions::from_config(&self.config))
    }

    /// Waiter with a one-off timeout
    #[must_use]
    pub fn wait_with(&self, timeout: Duration) -> Waiter<'_> {
        self.waiter().with_timeout(timeout)
    }

    /// Click a located element
    pub async fn click(&self, element: &Element) -> E2eResult<()> {
        tracing::debug!(locator = %element.locator, index = element.index, "click");
        self.driver.click(&element.locator, element.index).await
    }

    /// Clear a located form field
    pub async fn clear(&self, element: &Element) -> E2eResult<()> {
        self.driver.clear(&element.locator, element.index).await
    }

    /// Type into a located element
    pub async fn send_keys(&self, element: &Element, text: &str) -> E2eResult<()> {
        tracing::debug!(locator = %element.locator, index = element.index, text, "send keys");
        self.driver.send_keys(&element.locator, element.index, text).await
    }

    /// Capture the page as PNG bytes
    pub async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    /// Close the browser session
    pub async fn close(self) -> E2eResult<()> {
        tracing::info!(driver = self.driver.name(), "session closing");
        self.driver.close().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::Viewport;
    use crate::driver::ElementState;
    use crate::locator::Locator;
    use crate::mock::MockDriver;

    async fn open(driver: &MockDriver, config: SessionConfig) -> Session {
        Session::open(config, Box::new(driver.clone())).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_applies_viewport() {
        let driver = MockDriver::new();
        let _session = open(&driver, SessionConfig::new().with_viewport(1280, 720)).await;
        assert_eq!(driver.viewport(), Some(Viewport { width: 1280, height: 720 }));
    }

    #[tokio::test]
    async fn test_goto_joins_base_url() {
        let driver = MockDriver::new();
        let session = open(&driver, SessionConfig::new().with_base_url("http://hotel:8080/")).await;
        session.goto("").await.unwrap();
        session.goto("add").await.unwrap();
        assert_eq!(
            driver.history()[1..],
            ["goto:http://hotel:8080/", "goto:http://hotel:8080/add"]
        );
    }

    #[tokio::test]
    async fn test_goto_without_base_url_fails() {
        let driver = MockDriver::new();
        let session = open(&driver, SessionConfig::new()).await;
        assert!(matches!(
            session.goto("").await.unwrap_err(),
            crate::E2eError::MissingBaseUrl
        ));
    }

    #[tokio::test]
    async fn test_element_actions_go_through_driver() {
        let driver = MockDriver::new();
        let field = Locator::name("roomNumber");
        driver.add_element(field.clone(), ElementState::new("input").with_value("1"));
        let session = open(&driver, SessionConfig::new()).await;

        let el = session.waiter().present(&field).await.unwrap();
        session.clear(&el).await.unwrap();
        session.send_keys(&el, "204").await.unwrap();
        assert_eq!(driver.value_of(&field, 0).as_deref(), Some("204"));
    }

    #[tokio::test]
    async fn test_close_closes_driver() {
        let driver = MockDriver::new();
        let session = open(&driver, SessionConfig::new()).await;
        session.close().await.unwrap();
        assert!(driver.is_closed());
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_launch_without_browser_feature() {
        let err = Session::launch(SessionConfig::new()).await.unwrap_err();
        assert!(matches!(err, crate::E2eError::BrowserUnavailable));
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_launch_refuses_webdriver_grid_first() {
        let config = SessionConfig::new().with_grid_url("http://grid:4444/wd/hub");
        let err = Session::launch(config).await.unwrap_err();
        assert!(err.to_string().contains("Selenium Grid"));
    }
}
