//! Landing page: title, navigation bar and welcome heading.

use crate::assertion::Assertion;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;

/// Document title of the landing page
pub const HOME_TITLE: &str = "AWS App Runner Hotel";

/// Main heading of the landing page
pub const WELCOME_HEADING: &str = "Welcome to AWS App Runner Hotel";

/// Links the navigation bar must offer
pub const NAV_LINKS: [&str; 3] = ["Home", "Rooms", "Add"];

/// Something on the landing page that can be verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeElement {
    /// Document title equals the text
    Title(String),
    /// Navigation bar lists every entry of [`NAV_LINKS`]
    Navbar,
    /// First `h1` equals the text
    Heading(String),
}

/// Landing page object
#[derive(Debug, Clone)]
pub struct HomePage {
    title_tag: Locator,
    navbar: Locator,
    toggler: Locator,
    heading: Locator,
}

impl Default for HomePage {
    fn default() -> Self {
        Self {
            title_tag: Locator::xpath("/html/head/title"),
            navbar: Locator::id("navbarNav"),
            toggler: Locator::class("navbar-toggler"),
            heading: Locator::tag("h1"),
        }
    }
}

impl PageObject for HomePage {
    fn path(&self) -> &str {
        ""
    }

    fn title(&self) -> &str {
        HOME_TITLE
    }
}

impl HomePage {
    /// Create the page object
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigate to the base URL
    pub async fn open(&self, session: &Session) -> E2eResult<()> {
        session.goto(self.path()).await
    }

    /// Verify one element of the page
    pub async fn verify(&self, session: &Session, element: &HomeElement) -> E2eResult<()> {
        match element {
            HomeElement::Title(expected) => self.verify_title(session, expected).await,
            HomeElement::Navbar => self.verify_navbar(session).await,
            HomeElement::Heading(expected) => self.verify_heading(session, expected).await,
        }
    }

    async fn verify_title(&self, session: &Session, expected: &str) -> E2eResult<()> {
        let waiter = session.waiter();
        let _ = waiter.present(&self.title_tag).await?;

        // The title can lag a click-triggered navigation; settle before comparing.
        match waiter.title_is(expected).await {
            Ok(_) => Ok(()),
            Err(E2eError::Timeout { .. }) => {
                let actual = session.title().await?;
                Assertion::equals(expected, actual.as_str())
                    .context("page title")
                    .into_result()
            }
            Err(e) => Err(e),
        }
    }

    async fn verify_navbar(&self, session: &Session) -> E2eResult<()> {
        let waiter = session.waiter();
        let _ = waiter.present(&self.navbar).await?;

        // A collapsed navbar hides its links behind the toggler.
        let togglers = session.driver().query(&self.toggler).await?;
        if togglers.first().is_some_and(|t| t.visible) {
            tracing::debug!("expanding collapsed navbar");
            session.driver().click(&self.toggler, 0).await?;
        }

        let navbar = waiter.text_ready(&self.navbar).await?;
        for link in NAV_LINKS {
            Assertion::contains(navbar.text(), link)
                .context(&format!("navbar is missing '{link}'"))
                .into_result()?;
        }
        Ok(())
    }

    async fn verify_heading(&self, session: &Session, expected: &str) -> E2eResult<()> {
        let heading = session.waiter().visible(&self.heading).await?;
        Assertion::equals(expected, heading.text())
            .context("heading")
            .into_result()
    }
}
