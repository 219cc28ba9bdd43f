//! Session configuration.
//!
//! Everything a scenario needs to open its browser session lives in one
//! [`SessionConfig`] value that is built once per run and handed to each
//! session. Nothing here is process-wide mutable state; reading the
//! environment happens in [`SessionConfig::from_env`] and nowhere else.

use serde::Serialize;
use std::time::Duration;

/// Environment variable holding the application URL
pub const BASE_URL_ENV: &str = "BASE_URL";

/// Environment variable holding the remote browser endpoint
pub const GRID_URL_ENV: &str = "GRID_URL";

/// Environment variable overriding the browser binary
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// Environment variable that shows the browser window when set
pub const HEADED_ENV: &str = "HOTEL_E2E_HEADED";

/// Default implicit wait (10 seconds)
pub const DEFAULT_IMPLICIT_WAIT_MS: u64 = 10_000;

/// Default polling interval for waits (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default viewport width
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1920;

/// Default viewport height
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1080;

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Browser options profile, applied to local launches and remote sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserProfile {
    /// Run in headless mode
    pub headless: bool,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent override
    pub user_agent: Option<String>,
    /// Extra command-line switches for a local launch
    pub args: Vec<String>,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
            user_agent: None,
            args: Vec::new(),
        }
    }
}

/// Where the browser runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "endpoint", rename_all = "snake_case")]
pub enum DriverTarget {
    /// Launch a local Chromium process
    Local,
    /// Connect to a remote browser endpoint
    Remote(String),
}

/// Configuration for one browser session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    /// Application under test (None = no navigation target)
    pub base_url: Option<String>,
    /// Remote browser endpoint (None = local launch)
    pub grid_url: Option<String>,
    /// Default timeout for every wait
    #[serde(serialize_with = "serialize_millis")]
    pub implicit_wait: Duration,
    /// Polling interval for every wait
    #[serde(serialize_with = "serialize_millis")]
    pub poll_interval: Duration,
    /// Window size applied when the session opens
    pub viewport: Viewport,
    /// Browser options
    pub profile: BrowserProfile,
}

pub(crate) fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            grid_url: None,
            implicit_wait: Duration::from_millis(DEFAULT_IMPLICIT_WAIT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            viewport: Viewport::default(),
            profile: BrowserProfile::default(),
        }
    }
}

impl SessionConfig {
    /// Create a config with defaults and no environment applied
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        config.base_url = get(BASE_URL_ENV);
        config.grid_url = get(GRID_URL_ENV);
        config.profile.chromium_path = get(CHROMIUM_PATH_ENV);
        if get(HEADED_ENV).is_some() {
            config.profile.headless = false;
        }
        config
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the remote browser endpoint
    #[must_use]
    pub fn with_grid_url(mut self, url: impl Into<String>) -> Self {
        self.grid_url = Some(url.into());
        self
    }

    /// Set the implicit wait
    #[must_use]
    pub const fn with_implicit_wait(mut self, wait: Duration) -> Self {
        self.implicit_wait = wait;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.profile.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.profile.sandbox = false;
        self
    }

    /// Where the browser for this config runs
    #[must_use]
    pub fn target(&self) -> DriverTarget {
        self.grid_url
            .clone()
            .map_or(DriverTarget::Local, DriverTarget::Remote)
    }

    /// Check the remote endpoint, if any, is one the browser driver can dial
    pub fn validate(&self) -> crate::E2eResult<()> {
        if let Some(url) = &self.grid_url {
            let _ = cdp_endpoint(url)?;
        }
        Ok(())
    }

    /// Join a path onto the base URL
    pub fn url_for(&self, path: &str) -> crate::E2eResult<String> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(crate::E2eError::MissingBaseUrl)?;
        if path.is_empty() {
            return Ok(base.to_string());
        }
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

/// Accept `GRID_URL` as a Chrome DevTools endpoint.
///
/// Either a `ws://` browser websocket or the `http://` address serving
/// `/json/version`. Selenium Grid and other WebDriver URLs are refused.
pub fn cdp_endpoint(url: &str) -> crate::E2eResult<&str> {
    let refuse = |reason: &str| {
        crate::E2eError::config(format!(
            "GRID_URL '{url}' {reason}; expected a Chrome DevTools endpoint such as \
             ws://host:9222/devtools/browser/<id> or http://host:9222"
        ))
    };

    let Some((scheme, rest)) = url.trim().split_once("://") else {
        return Err(refuse("has no scheme"));
    };
    if !matches!(scheme, "ws" | "wss" | "http" | "https") {
        return Err(refuse("has an unsupported scheme"));
    }

    let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
    let path = path.trim_end_matches('/');
    let webdriver = path.contains("wd/hub")
        || path == "session"
        || path.ends_with("/session")
        || authority.ends_with(":4444");
    if webdriver {
        return Err(refuse("looks like a Selenium Grid (WebDriver) endpoint"));
    }
    Ok(url.trim())
}
