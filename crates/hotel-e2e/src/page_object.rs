//! Page Object Model support.
//!
//! Each page of the hotel application is a small struct of locators with
//! async verification methods. [`PageObject`] carries the parts every page
//! shares: where it lives and what its title is.

use crate::result::E2eResult;
use crate::session::Session;
use async_trait::async_trait;

/// A page or component of the application under test
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Path under the base URL ("" for the root)
    fn path(&self) -> &str;

    /// Exact document title once loaded
    fn title(&self) -> &str;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("page")
    }

    /// Navigate straight to the page and wait for its title
    async fn visit(&self, session: &Session) -> E2eResult<()> {
        tracing::debug!(page = self.page_name(), "visit");
        session.goto(self.path()).await?;
        let _ = session.waiter().title_is(self.title()).await?;
        Ok(())
    }

    /// Whether the current title is this page's title
    async fn is_current(&self, session: &Session) -> E2eResult<bool> {
        Ok(session.title().await? == self.title())
    }
}
