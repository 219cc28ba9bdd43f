//! Chromium driver over the DevTools protocol.
//!
//! A local session launches its own Chromium; a remote session connects to
//! the endpoint in `GRID_URL` and opens a fresh page there. Element queries
//! and actions run as page scripts built from [`Locator::to_query_all`], so
//! every call sees the live document.

use crate::config::{cdp_endpoint, DriverTarget, SessionConfig, Viewport};
use crate::driver::{discard, Driver, ElementState};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Driver backed by a real Chromium page
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Arc<Mutex<CdpBrowser>>,
    page: CdpPage,
    handle: tokio::task::JoinHandle<()>,
    target: DriverTarget,
}

impl ChromiumDriver {
    /// Open a page on the browser the config points at
    pub async fn open(config: &SessionConfig) -> E2eResult<Self> {
        match config.target() {
            DriverTarget::Local => Self::launch(config).await,
            DriverTarget::Remote(endpoint) => Self::connect(config, &endpoint).await,
        }
    }

    /// Launch a local Chromium and open a blank page
    pub async fn launch(config: &SessionConfig) -> E2eResult<Self> {
        let profile = &config.profile;
        let mut builder = CdpConfig::builder().window_size(config.viewport.width, config.viewport.height);

        if !profile.headless {
            builder = builder.with_head();
        }
        if !profile.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = profile.chromium_path {
            builder = builder.chrome_executable(path);
        }
        if let Some(ref agent) = profile.user_agent {
            builder = builder.arg(format!("--user-agent={agent}"));
        }
        for arg in &profile.args {
            builder = builder.arg(arg.clone());
        }

        let cdp_config = builder
            .build()
            .map_err(|message| E2eError::BrowserLaunchError { message })?;

        let (browser, handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| E2eError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

        tracing::info!(headless = profile.headless, "launched local chromium");
        Self::attach(browser, handler, DriverTarget::Local).await
    }

    /// Connect to a remote browser endpoint and open a blank page.
    ///
    /// The remote browser was started by someone else, so only the user agent
    /// of the profile can still be applied.
    pub async fn connect(config: &SessionConfig, endpoint: &str) -> E2eResult<Self> {
        let endpoint = cdp_endpoint(endpoint)?;
        let profile = &config.profile;
        if !profile.headless || !profile.args.is_empty() || profile.chromium_path.is_some() {
            tracing::warn!(
                endpoint,
                "launch options (headed, args, chromium path) do not apply to a remote browser"
            );
        }

        let (browser, handler) =
            CdpBrowser::connect(endpoint)
                .await
                .map_err(|e| E2eError::ConnectionFailed {
                    endpoint: endpoint.to_string(),
                    message: e.to_string(),
                })?;

        tracing::info!(endpoint, "connected to remote browser");
        let driver = Self::attach(browser, handler, DriverTarget::Remote(endpoint.to_string())).await?;

        if let Some(ref agent) = profile.user_agent {
            let applied = driver
                .page
                .execute(SetUserAgentOverrideParams::new(agent.clone()))
                .await;
            if let Err(e) = applied {
                return Err(discard(&driver, E2eError::script(e.to_string())).await);
            }
        }
        Ok(driver)
    }

    async fn attach(
        browser: CdpBrowser,
        mut handler: chromiumoxide::Handler,
        target: DriverTarget,
    ) -> E2eResult<Self> {
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handle.abort();
                return Err(E2eError::BrowserLaunchError {
                    message: e.to_string(),
                });
            }
        };

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            page,
            handle,
            target,
        })
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> E2eResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| E2eError::script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| E2eError::script(e.to_string()))
    }

    async fn act(&self, locator: &Locator, index: usize, body: &str) -> E2eResult<()> {
        let found: bool = self.eval(action_script(locator, index, body)).await?;
        if found {
            Ok(())
        } else {
            Err(E2eError::StaleElement {
                locator: locator.to_string(),
                index,
            })
        }
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let _ = self
            .page
            .goto(url)
            .await
            .map_err(|e| E2eError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        self.eval("document.title".to_string()).await
    }

    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementState>> {
        self.eval(snapshot_script(locator)).await
    }

    async fn click(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        self.act(locator, index, CLICK_BODY).await
    }

    async fn clear(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        self.act(locator, index, CLEAR_BODY).await
    }

    async fn send_keys(&self, locator: &Locator, index: usize, text: &str) -> E2eResult<()> {
        self.act(locator, index, &type_body(text)).await
    }

    async fn set_viewport(&self, viewport: Viewport) -> E2eResult<()> {
        let params = SetDeviceMetricsOverrideParams::new(
            i64::from(viewport.width),
            i64::from(viewport.height),
            1.0,
            false,
        );
        let _ = self
            .page
            .execute(params)
            .await
            .map_err(|e| E2eError::script(e.to_string()))?;
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        use base64::Engine;

        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| E2eError::script(e.to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| E2eError::script(e.to_string()))
    }

    async fn close(&self) -> E2eResult<()> {
        let page_result = self.page.clone().close().await;

        // A remote browser outlives the session; only a local one is shut down.
        let browser_result = if self.target == DriverTarget::Local {
            let mut browser = self.browser.lock().await;
            match browser.close().await {
                Ok(_) => browser.wait().await.map(|_| ()).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            }
        } else {
            Ok(())
        };
        self.handle.abort();

        page_result.map_err(|e| E2eError::script(e.to_string()))?;
        browser_result.map_err(|message| E2eError::BrowserLaunchError { message })
    }

    fn name(&self) -> &str {
        match self.target {
            DriverTarget::Local => "chromium",
            DriverTarget::Remote(_) => "chromium-remote",
        }
    }
}

// =============================================================================
// PAGE SCRIPTS
// =============================================================================

const CLICK_BODY: &str = "e.scrollIntoView({ block: 'center' }); e.click();";

const CLEAR_BODY: &str = "e.value = ''; \
    e.dispatchEvent(new Event('input', { bubbles: true })); \
    e.dispatchEvent(new Event('change', { bubbles: true }));";

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

fn snapshot_script(locator: &Locator) -> String {
    format!(
        "(() => {query}.map(e => {{ \
            const r = e.getBoundingClientRect(); \
            const s = window.getComputedStyle(e); \
            return {{ \
                tag: e.tagName.toLowerCase(), \
                text: e.innerText ?? e.textContent ?? '', \
                html: e.innerHTML ?? '', \
                value: typeof e.value === 'string' ? e.value : null, \
                visible: r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none', \
                enabled: !e.disabled \
            }}; \
        }}))()",
        query = locator.to_query_all()
    )
}

fn action_script(locator: &Locator, index: usize, body: &str) -> String {
    format!(
        "(() => {{ const e = {query}[{index}]; if (!e) {{ return false; }} {body} return true; }})()",
        query = locator.to_query_all()
    )
}

fn type_body(text: &str) -> String {
    let t = js_string(text);
    format!(
        "if (e.tagName === 'SELECT') {{ \
            const t = {t}.toLowerCase(); \
            const o = t === '' ? undefined : Array.from(e.options).find(o => o.text.trim().toLowerCase().startsWith(t) || o.value.toLowerCase().startsWith(t)); \
            if (o) {{ e.value = o.value; }} \
        }} else {{ \
            e.focus(); \
            e.value = (e.value ?? '') + {t}; \
            e.dispatchEvent(new Event('input', {{ bubbles: true }})); \
        }} \
        e.dispatchEvent(new Event('change', {{ bubbles: true }}));"
    )
}
