//! Room list page: the table of rooms and the stored-rooms alert.

use crate::assertion::Assertion;
use crate::driver::Element;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use regex::Regex;
use std::collections::BTreeSet;

/// Document title of the room list
pub const ROOM_LIST_TITLE: &str = "Room List";

/// Columns the room table must have
pub const ROOM_COLUMNS: [&str; 3] = ["Room Number", "Floor Number", "Good View"];

/// Pattern the stored-rooms alert must match
pub const STORED_ALERT_PATTERN: &str = r"^Rooms stored in database: (\d+)";

/// Something on the room list that can be verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomListElement {
    /// Document title equals the text
    Title(String),
    /// The room table is visible
    RoomTable,
}

/// Value of the "Good View" column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// Rendered with a `bg-success` badge
    Yes,
    /// Rendered with a `bg-danger` badge
    No,
}

impl ViewStatus {
    /// Parse "Yes" or "No"
    pub fn parse(value: &str) -> E2eResult<Self> {
        match value.trim() {
            "Yes" => Ok(Self::Yes),
            "No" => Ok(Self::No),
            other => Err(E2eError::config(format!(
                "view status must be \"Yes\" or \"No\", got \"{other}\""
            ))),
        }
    }

    /// Badge class the row must carry
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Yes => "bg-success",
            Self::No => "bg-danger",
        }
    }

    /// Badge class the row must not carry
    #[must_use]
    pub const fn opposite_class(self) -> &'static str {
        match self {
            Self::Yes => "bg-danger",
            Self::No => "bg-success",
        }
    }
}

impl std::fmt::Display for ViewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Yes => "Yes",
            Self::No => "No",
        })
    }
}

/// Cells of a rendered table row.
///
/// A row's rendered text separates cells with tabs.
fn row_cells(row: &Element) -> Vec<&str> {
    let text = row.state.text.trim_matches(|c| c == '\n' || c == ' ');
    if text.contains('\t') {
        text.split('\t').map(str::trim).collect()
    } else {
        text.split_whitespace().collect()
    }
}

/// Room list page object
#[derive(Debug, Clone)]
pub struct RoomListPage {
    rooms_link: Locator,
    table: Locator,
    headers: Locator,
    rows: Locator,
    alert: Locator,
}

impl Default for RoomListPage {
    fn default() -> Self {
        Self {
            rooms_link: Locator::link_text("Rooms"),
            table: Locator::css("table"),
            headers: Locator::css("table thead th"),
            rows: Locator::css("tbody tr"),
            alert: Locator::css(".alert-info"),
        }
    }
}

impl PageObject for RoomListPage {
    fn path(&self) -> &str {
        "rooms"
    }

    fn title(&self) -> &str {
        ROOM_LIST_TITLE
    }
}

impl RoomListPage {
    /// Create the page object
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the "Rooms" navigation link
    pub async fn open(&self, session: &Session) -> E2eResult<()> {
        let link = session.waiter().clickable(&self.rooms_link).await?;
        session.click(&link).await
    }

    /// Verify one element of the page
    pub async fn verify(&self, session: &Session, element: &RoomListElement) -> E2eResult<()> {
        match element {
            RoomListElement::Title(expected) => {
                let _ = session.waiter().title_is(expected).await?;
                Ok(())
            }
            RoomListElement::RoomTable => {
                let _ = session.waiter().visible(&self.table).await?;
                Ok(())
            }
        }
    }

    /// Verify the set of table headers is exactly [`ROOM_COLUMNS`]
    pub async fn verify_table_columns(&self, session: &Session) -> E2eResult<()> {
        let headers = session.waiter().all_visible(&self.headers).await?;
        let actual: BTreeSet<&str> = headers.iter().map(Element::text).collect();
        let expected: BTreeSet<&str> = ROOM_COLUMNS.into_iter().collect();
        Assertion::equals(&expected, &actual)
            .context("table headers")
            .into_result()
    }

    /// Verify the row for `room_number` shows its floor and view badge
    pub async fn verify_room_details(
        &self,
        session: &Session,
        room_number: &str,
        floor_number: &str,
        view_status: &str,
    ) -> E2eResult<()> {
        let view = ViewStatus::parse(view_status)?;
        let rows = session.waiter().all_present(&self.rows).await?;

        let row = rows
            .iter()
            .find(|row| row_cells(row).first() == Some(&room_number))
            .ok_or_else(|| {
                E2eError::assertion(format!(
                    "no row with room number {room_number} among {} rows",
                    rows.len()
                ))
            })?;

        let cells = row_cells(row);
        Assertion::equals(floor_number, cells.get(1).copied().unwrap_or_default())
            .context(&format!("floor of room {room_number}"))
            .into_result()?;

        let subject = format!("view of room {room_number}, expected {view}");
        Assertion::contains(row.html(), view.badge_class())
            .context(&subject)
            .into_result()?;
        Assertion::not_contains(row.html(), view.opposite_class())
            .context(&subject)
            .into_result()
    }

    /// Verify the stored-rooms alert is visible and well formed
    pub async fn verify_rooms_stored_alert(&self, session: &Session) -> E2eResult<()> {
        let _ = self.stored_room_count(session).await?;
        Ok(())
    }

    /// Number of rooms the alert reports
    pub async fn stored_room_count(&self, session: &Session) -> E2eResult<u64> {
        let alert = session.waiter().visible(&self.alert).await?;
        let pattern = Regex::new(STORED_ALERT_PATTERN).map_err(|e| E2eError::InvalidPattern {
            pattern: STORED_ALERT_PATTERN.to_string(),
            message: e.to_string(),
        })?;
        Assertion::matches(&pattern, alert.text())
            .context("stored rooms alert")
            .into_result()?;

        pattern
            .captures(alert.text())
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| E2eError::assertion(format!("room count out of range in '{}'", alert.text())))
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

    fn row(number: &str, floor: &str, view: ViewStatus) -> ElementState {
        ElementState::new("tr")
            .with_text(format!("{number}\t{floor}\t{view}"))
            .with_html(format!(
                "<td>{number}</td><td>{floor}</td><td><span class=\"badge {}\">{view}</span></td>",
                view.badge_class()
            ))
    }

    fn room_list(driver: &MockDriver) {
        driver.set_title(ROOM_LIST_TITLE);
        driver.add_element(Locator::css("table"), ElementState::new("table"));
        driver.set_elements(
            Locator::css("table thead th"),
            ROOM_COLUMNS.iter().map(|c| ElementState::new("th").with_text(*c)).collect(),
        );
        driver.set_elements(
            Locator::css("tbody tr"),
            vec![row("101", "1", ViewStatus::Yes), row("1012", "3", ViewStatus::No)],
        );
        driver.add_element(
            Locator::css(".alert-info"),
            ElementState::new("div").with_text("Rooms stored in database: 2"),
        );
    }

    mod view_status_tests {
        use super::*;

        #[test]
        fn test_parse() {
            assert_eq!(ViewStatus::parse("Yes").unwrap(), ViewStatus::Yes);
            assert_eq!(ViewStatus::parse(" No ").unwrap(), ViewStatus::No);
            assert_eq!(
                ViewStatus::parse("Maybe").unwrap_err().kind(),
                FailureKind::Configuration
            );
        }

        #[test]
        fn test_badges_are_exclusive() {
            assert_eq!(ViewStatus::Yes.badge_class(), ViewStatus::No.opposite_class());
            assert_ne!(ViewStatus::Yes.badge_class(), ViewStatus::Yes.opposite_class());
        }
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_open_clicks_rooms_link() {
            let driver = MockDriver::new();
            let link = Locator::link_text("Rooms");
            driver.add_element(link.clone(), ElementState::new("a").with_text("Rooms"));
            driver.on_click(link, |page| page.set_title(ROOM_LIST_TITLE));

            let s = session(&driver).await;
            let page = RoomListPage::new();
            page.open(&s).await.unwrap();
            page.verify(&s, &RoomListElement::Title(ROOM_LIST_TITLE.to_string()))
                .await
                .unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_disabled_link_times_out() {
            let driver = MockDriver::new();
            driver.add_element(
                Locator::link_text("Rooms"),
                ElementState::new("a").with_visible(false),
            );
            let s = session(&driver).await;
            let err = RoomListPage::new().open(&s).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::Timeout);
        }
    }

    mod table_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_table_and_columns() {
            let driver = MockDriver::new();
            room_list(&driver);
            let s = session(&driver).await;
            let page = RoomListPage::new();
            page.verify(&s, &RoomListElement::RoomTable).await.unwrap();
            page.verify_table_columns(&s).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_column_fails() {
            let driver = MockDriver::new();
            room_list(&driver);
            driver.set_elements(
                Locator::css("table thead th"),
                vec![ElementState::new("th").with_text("Room Number")],
            );
            let s = session(&driver).await;
            let err = RoomListPage::new().verify_table_columns(&s).await.unwrap_err();
            assert!(err.to_string().contains("Floor Number"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_extra_column_fails() {
            let driver = MockDriver::new();
            room_list(&driver);
            driver.with_page(|p| {
                p.set_elements(
                    Locator::css("table thead th"),
                    ["Room Number", "Floor Number", "Good View", "Price"]
                        .iter()
                        .map(|c| ElementState::new("th").with_text(*c))
                        .collect(),
                );
            });
            let s = session(&driver).await;
            assert!(RoomListPage::new().verify_table_columns(&s).await.is_err());
        }

        #[tokio::test(start_paused = true)]
        async fn test_columns_hold_with_zero_rows() {
            let driver = MockDriver::new();
            room_list(&driver);
            driver.set_elements(Locator::css("tbody tr"), Vec::new());
            let s = session(&driver).await;
            RoomListPage::new().verify_table_columns(&s).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_room_details_match_exact_room() {
            let driver = MockDriver::new();
            room_list(&driver);
            let s = session(&driver).await;
            let page = RoomListPage::new();
            page.verify_room_details(&s, "101", "1", "Yes").await.unwrap();
            page.verify_room_details(&s, "1012", "3", "No").await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_room_details_wrong_view() {
            let driver = MockDriver::new();
            room_list(&driver);
            let s = session(&driver).await;
            let err = RoomListPage::new()
                .verify_room_details(&s, "101", "1", "No")
                .await
                .unwrap_err();
            assert_eq!(err.kind(), FailureKind::Assertion);
            assert!(err.to_string().contains("bg-danger"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_room_details_wrong_floor() {
            let driver = MockDriver::new();
            room_list(&driver);
            let s = session(&driver).await;
            let err = RoomListPage::new()
                .verify_room_details(&s, "101", "2", "Yes")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("floor of room 101"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_room_details_missing_room() {
            let driver = MockDriver::new();
            room_list(&driver);
            let s = session(&driver).await;
            let err = RoomListPage::new()
                .verify_room_details(&s, "10", "1", "Yes")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("no row with room number 10"));
        }
    }

    mod alert_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_stored_room_count() {
            let driver = MockDriver::new();
            room_list(&driver);
            let s = session(&driver).await;
            let page = RoomListPage::new();
            page.verify_rooms_stored_alert(&s).await.unwrap();
            assert_eq!(page.stored_room_count(&s).await.unwrap(), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_malformed_alert_fails() {
            let driver = MockDriver::new();
            room_list(&driver);
            driver.set_elements(
                Locator::css(".alert-info"),
                vec![ElementState::new("div").with_text("No rooms yet")],
            );
            let s = session(&driver).await;
            let err = RoomListPage::new().verify_rooms_stored_alert(&s).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::Assertion);
        }
    }
}
