//! Session fixture.
//!
//! Each scenario gets a fresh browser session that is torn down when the
//! scenario ends, whether it passed, failed or panicked. Sessions come from
//! a [`SessionFactory`] so the runner never knows which browser backs them.

use crate::config::SessionConfig;
use crate::driver::Driver;
use crate::result::E2eResult;
use crate::session::Session;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Opens browser sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a new session for the config
    async fn create(&self, config: &SessionConfig) -> E2eResult<Session>;

    /// Name used in logs
    fn name(&self) -> &str {
        "sessions"
    }
}

/// Sessions backed by Chromium, local or remote depending on the config.
///
/// Without the `browser` feature every `create` fails with
/// `BrowserUnavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumSessions;

#[async_trait]
impl SessionFactory for ChromiumSessions {
    async fn create(&self, config: &SessionConfig) -> E2eResult<Session> {
        Session::launch(config.clone()).await
    }

    fn name(&self) -> &str {
        "chromium"
    }
}

/// Sessions over drivers built by a closure
pub struct DriverFactory<F> {
    make: F,
}

impl<F> std::fmt::Debug for DriverFactory<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverFactory").finish_non_exhaustive()
    }
}

impl<F> DriverFactory<F> {
    /// Create a factory from a driver constructor
    #[must_use]
    pub const fn new(make: F) -> Self {
        Self { make }
    }
}

#[async_trait]
impl<F, D> SessionFactory for DriverFactory<F>
where
    F: Fn() -> D + Send + Sync,
    D: Driver + 'static,
{
    async fn create(&self, config: &SessionConfig) -> E2eResult<Session> {
        Session::open(config.clone(), Box::new((self.make)())).await
    }

    fn name(&self) -> &str {
        "driver"
    }
}

/// What a scoped session body produced, and how teardown went
#[derive(Debug)]
pub struct SessionOutcome<T> {
    /// Value returned by the body
    pub value: T,
    /// Result of closing the session
    pub teardown: E2eResult<()>,
}

/// Run `body` inside a fresh session and always close it afterwards.
///
/// Fails only when the session cannot be opened. A panic in the body is
/// re-raised after the session is closed.
pub async fn scoped<T, B>(
    factory: &dyn SessionFactory,
    config: &SessionConfig,
    body: B,
) -> E2eResult<SessionOutcome<T>>
where
    B: for<'s> FnOnce(&'s Session) -> BoxFuture<'s, T>,
{
    let session = factory.create(config).await?;
    let outcome = AssertUnwindSafe(body(&session)).catch_unwind().await;
    let teardown = session.close().await;
    if let Err(e) = &teardown {
        tracing::warn!(error = %e, factory = factory.name(), "session teardown failed");
    }

    match outcome {
        Ok(value) => Ok(SessionOutcome { value, teardown }),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Run a fallible `body` inside a fresh session and always close it afterwards.
///
/// The body's error wins over a teardown error; a teardown error alone is
/// returned.
pub async fn with_session<T, B>(
    factory: &dyn SessionFactory,
    config: &SessionConfig,
    body: B,
) -> E2eResult<T>
where
    B: for<'s> FnOnce(&'s Session) -> BoxFuture<'s, E2eResult<T>>,
{
    let outcome = scoped(factory, config, body).await?;
    match outcome.value {
        Ok(value) => outcome.teardown.map(|()| value),
        Err(e) => Err(e),
    }
}
