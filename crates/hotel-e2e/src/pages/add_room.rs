//! Add-room form: fields, submission and its outcome.

use crate::assertion::Assertion;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::pages::rooms::ROOM_LIST_TITLE;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use std::time::Duration;

/// Document title of the add-room form
pub const ADD_ROOM_TITLE: &str = "Add new room";

/// Label of the submit button
pub const SUBMIT_LABEL: &str = "Add room";

/// How long a refused submission is watched for a late redirect or message
pub const NOT_ADDED_SETTLE_MS: u64 = 2_000;

/// A field of the add-room form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `roomNumber` text input
    RoomNumber,
    /// `floorNumber` text input
    FloorNumber,
    /// `hasView` dropdown
    GoodView,
}

impl Field {
    /// Every field, in form order
    pub const ALL: [Self; 3] = [Self::RoomNumber, Self::FloorNumber, Self::GoodView];

    /// `name` attribute of the control
    #[must_use]
    pub const fn name_attr(self) -> &'static str {
        match self {
            Self::RoomNumber => "roomNumber",
            Self::FloorNumber => "floorNumber",
            Self::GoodView => "hasView",
        }
    }

    /// Label shown next to the control
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RoomNumber => "Room number",
            Self::FloorNumber => "Floor number",
            Self::GoodView => "Good View",
        }
    }

    /// Locator for the control
    #[must_use]
    pub fn locator(self) -> Locator {
        Locator::name(self.name_attr())
    }
}

/// What a successful submission looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expectation {
    /// An inline message mentioning "Room number" and "added"
    Message,
    /// The browser lands on the room list
    Redirect,
    /// Whichever of the two shows up first
    #[default]
    Either,
}

/// Add-room page object
#[derive(Debug, Clone)]
pub struct AddRoomPage {
    add_link: Locator,
    submit: Locator,
    results: Locator,
}

impl Default for AddRoomPage {
    fn default() -> Self {
        Self {
            add_link: Locator::link_text("Add"),
            submit: Locator::css("button[type=\"submit\"]"),
            results: Locator::css(".results p"),
        }
    }
}

impl PageObject for AddRoomPage {
    fn path(&self) -> &str {
        "add"
    }

    fn title(&self) -> &str {
        ADD_ROOM_TITLE
    }
}

fn is_success_message(text: &str) -> bool {
    text.contains("Room number") && text.contains("added")
}

impl AddRoomPage {
    /// Create the page object
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the "Add" navigation link
    pub async fn open(&self, session: &Session) -> E2eResult<()> {
        let link = session.waiter().present(&self.add_link).await?;
        session.click(&link).await
    }

    /// Verify title, fields and submit button together
    pub async fn verify_page(&self, session: &Session) -> E2eResult<()> {
        let _ = session.waiter().title_is(ADD_ROOM_TITLE).await?;
        self.verify_form_fields(session).await?;
        self.verify_submit_button(session).await
    }

    /// Verify every form field is present
    pub async fn verify_form_fields(&self, session: &Session) -> E2eResult<()> {
        let waiter = session.waiter();
        for field in Field::ALL {
            match waiter.present(&field.locator()).await {
                Ok(_) => {}
                Err(E2eError::Timeout { ms, last_error, .. }) => {
                    return Err(E2eError::Timeout {
                        condition: format!("'{}' field ({})", field.label(), field.locator()),
                        ms,
                        last_error,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Verify the submit button is labelled [`SUBMIT_LABEL`]
    pub async fn verify_submit_button(&self, session: &Session) -> E2eResult<()> {
        let button = session.waiter().present(&self.submit).await?;
        Assertion::equals(SUBMIT_LABEL, button.text())
            .context("submit button label")
            .into_result()
    }

    /// Fill a field.
    ///
    /// Text inputs are cleared first; the dropdown picks the option matching
    /// the typed text. An empty value leaves a text input blank.
    pub async fn fill(&self, session: &Session, field: Field, value: &str) -> E2eResult<()> {
        let control = session.waiter().present(&field.locator()).await?;
        tracing::debug!(field = field.label(), value, "fill");
        if field != Field::GoodView {
            session.clear(&control).await?;
        }
        session.send_keys(&control, value).await
    }

    /// Leave the room number empty
    pub async fn leave_room_number_blank(&self, session: &Session) -> E2eResult<()> {
        self.fill(session, Field::RoomNumber, "").await
    }

    /// Click the submit button
    pub async fn submit(&self, session: &Session) -> E2eResult<()> {
        let button = session.waiter().clickable(&self.submit).await?;
        session.click(&button).await
    }

    /// Verify the submission added a room
    pub async fn verify_added(&self, session: &Session, expectation: Expectation) -> E2eResult<()> {
        match expectation {
            Expectation::Message => {
                let message = session.waiter().present(&self.results).await?;
                Assertion::is_true(
                    is_success_message(message.text()),
                    &format!("expected success message, got '{}'", message.text()),
                )
                .into_result()
            }
            Expectation::Redirect => {
                let _ = session.waiter().title_is(ROOM_LIST_TITLE).await?;
                Ok(())
            }
            Expectation::Either => {
                let driver = session.driver();
                let results = &self.results;
                session
                    .waiter()
                    .until("room to be added (redirect or success message)", || async move {
                        if driver.title().await? == ROOM_LIST_TITLE {
                            return Ok(Some(()));
                        }
                        let found = driver.query(results).await?;
                        Ok::<_, E2eError>(found
                            .iter()
                            .any(|m| is_success_message(&m.text))
                            .then_some(()))
                    })
                    .await
            }
        }
    }

    /// Verify the submission was refused: still on the form, no success message.
    ///
    /// Watches the page for [`NOT_ADDED_SETTLE_MS`] (or the implicit wait, if
    /// shorter) and fails as soon as a redirect or success message shows up.
    pub async fn verify_not_added(&self, session: &Session) -> E2eResult<()> {
        let settle = session
            .config()
            .implicit_wait
            .min(Duration::from_millis(NOT_ADDED_SETTLE_MS));
        let driver = session.driver();
        let results = &self.results;
        let added = session
            .wait_with(settle)
            .until("submission to settle", || async move {
                if driver.title().await? == ROOM_LIST_TITLE {
                    return Ok(Some(format!("redirected to '{ROOM_LIST_TITLE}'")));
                }
                let found = driver.query(results).await?;
                Ok::<_, E2eError>(
                    found
                        .iter()
                        .find(|m| is_success_message(&m.text))
                        .map(|m| format!("'{}'", m.text.trim())),
                )
            })
            .await;

        match added {
            Ok(evidence) => return Err(E2eError::assertion(format!("room was added: {evidence}"))),
            Err(E2eError::Timeout { .. }) => {}
            Err(e) => return Err(e),
        }

        let _ = session.waiter().present(&Field::RoomNumber.locator()).await?;
        let title = session.title().await?;
        Assertion::equals(ADD_ROOM_TITLE, title.as_str())
            .context("page after refused submission")
            .into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::ElementState;
    use crate::mock::MockDriver;
    use crate::FailureKind;
    use std::time::Duration;

    async fn session(driver: &MockDriver) -> Session {
        let config = SessionConfig::new()
            .with_base_url("http://hotel.test")
            .with_implicit_wait(Duration::from_millis(500));
        Session::open(config, Box::new(driver.clone())).await.unwrap()
    }

    fn form(driver: &MockDriver) {
        driver.set_title(ADD_ROOM_TITLE);
        driver.add_element(Field::RoomNumber.locator(), ElementState::new("input").with_value(""));
        driver.add_element(Field::FloorNumber.locator(), ElementState::new("input").with_value(""));
        driver.add_element(Field::GoodView.locator(), ElementState::new("select").with_value("No"));
        driver.add_element(
            Locator::css("button[type=\"submit\"]"),
            ElementState::new("button").with_text(SUBMIT_LABEL),
        );
    }

    mod form_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_open_clicks_add_link() {
            let driver = MockDriver::new();
            let link = Locator::link_text("Add");
            driver.add_element(link.clone(), ElementState::new("a").with_text("Add"));
            let s = session(&driver).await;
            AddRoomPage::new().open(&s).await.unwrap();
            assert!(driver.was_called("click:link text 'Add'#0"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_verify_page() {
            let driver = MockDriver::new();
            form(&driver);
            let s = session(&driver).await;
            AddRoomPage::new().verify_page(&s).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_field_names_it() {
            let driver = MockDriver::new();
            form(&driver);
            driver.with_page(|p| p.remove_elements(&Field::FloorNumber.locator()));
            let s = session(&driver).await;
            let err = AddRoomPage::new().verify_form_fields(&s).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::Timeout);
            assert!(err.to_string().contains("'Floor number' field"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_wrong_submit_label() {
            let driver = MockDriver::new();
            form(&driver);
            driver.set_elements(
                Locator::css("button[type=\"submit\"]"),
                vec![ElementState::new("button").with_text("Save")],
            );
            let s = session(&driver).await;
            let err = AddRoomPage::new().verify_submit_button(&s).await.unwrap_err();
            assert!(err.to_string().contains("\"Save\""));
        }

        #[tokio::test(start_paused = true)]
        async fn test_fill_clears_inputs_but_not_select() {
            let driver = MockDriver::new();
            form(&driver);
            driver.set_elements(
                Field::RoomNumber.locator(),
                vec![ElementState::new("input").with_value("stale")],
            );
            let s = session(&driver).await;
            let page = AddRoomPage::new();
            page.fill(&s, Field::RoomNumber, "101").await.unwrap();
            page.fill(&s, Field::GoodView, "Yes").await.unwrap();

            assert_eq!(driver.value_of(&Field::RoomNumber.locator(), 0).as_deref(), Some("101"));
            assert_eq!(driver.value_of(&Field::GoodView.locator(), 0).as_deref(), Some("Yes"));
            assert!(!driver.was_called("clear:name 'hasView'"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_leave_blank_empties_room_number() {
            let driver = MockDriver::new();
            form(&driver);
            driver.set_elements(
                Field::RoomNumber.locator(),
                vec![ElementState::new("input").with_value("101")],
            );
            let s = session(&driver).await;
            AddRoomPage::new().leave_room_number_blank(&s).await.unwrap();
            assert_eq!(driver.value_of(&Field::RoomNumber.locator(), 0).as_deref(), Some(""));
        }
    }

    mod outcome_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_message_expectation() {
            let driver = MockDriver::new();
            form(&driver);
            driver.add_element(
                Locator::css(".results p"),
                ElementState::new("p").with_text("Room number 101 added"),
            );
            let s = session(&driver).await;
            let page = AddRoomPage::new();
            page.verify_added(&s, Expectation::Message).await.unwrap();
            page.verify_added(&s, Expectation::Either).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_redirect_expectation() {
            let driver = MockDriver::new();
            driver.set_title(ADD_ROOM_TITLE);
            driver.set_title_after(2, ROOM_LIST_TITLE);
            let s = session(&driver).await;
            AddRoomPage::new()
                .verify_added(&s, Expectation::Redirect)
                .await
                .unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_either_times_out_when_nothing_happens() {
            let driver = MockDriver::new();
            form(&driver);
            let s = session(&driver).await;
            let err = AddRoomPage::new()
                .verify_added(&s, Expectation::Either)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), FailureKind::Timeout);
        }

        #[tokio::test(start_paused = true)]
        async fn test_wrong_message_fails() {
            let driver = MockDriver::new();
            form(&driver);
            driver.add_element(
                Locator::css(".results p"),
                ElementState::new("p").with_text("Room number is required"),
            );
            let s = session(&driver).await;
            let err = AddRoomPage::new()
                .verify_added(&s, Expectation::Message)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), FailureKind::Assertion);
        }

        #[tokio::test(start_paused = true)]
        async fn test_not_added() {
            let driver = MockDriver::new();
            form(&driver);
            let s = session(&driver).await;
            AddRoomPage::new().verify_not_added(&s).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_not_added_sees_late_redirect() {
            let driver = MockDriver::new();
            form(&driver);
            driver.set_title_after(1, ROOM_LIST_TITLE);
            let s = session(&driver).await;
            let err = AddRoomPage::new().verify_not_added(&s).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::Assertion);
            assert!(err.to_string().contains("redirected to 'Room List'"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_not_added_sees_late_message() {
            let driver = MockDriver::new();
            form(&driver);
            driver.reveal_after(
                Locator::css(".results p"),
                1,
                vec![ElementState::new("p").with_text("Room number 1 added")],
            );
            let s = session(&driver).await;
            let err = AddRoomPage::new().verify_not_added(&s).await.unwrap_err();
            assert!(err.to_string().contains("'Room number 1 added'"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_not_added_watches_for_settle_window() {
            let driver = MockDriver::new();
            form(&driver);
            let s = session(&driver).await;
            let start = tokio::time::Instant::now();
            AddRoomPage::new().verify_not_added(&s).await.unwrap();
            assert!(start.elapsed() >= Duration::from_millis(500));
            assert!(driver.query_count(&Locator::css(".results p")) > 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_not_added_fails_after_redirect_message() {
            let driver = MockDriver::new();
            form(&driver);
            driver.add_element(
                Locator::css(".results p"),
                ElementState::new("p").with_text("Room number 7 added"),
            );
            let s = session(&driver).await;
            let err = AddRoomPage::new().verify_not_added(&s).await.unwrap_err();
            assert!(err.to_string().contains("room was added"));
        }
    }
}
