//! In-memory hotel application for integration tests.
//!
//! [`FakeHotel`] holds the room database; [`FakeHotel::browser`] opens a
//! fresh browser on it that renders the homepage, the room list and the
//! add-room form the way the real application does, down to the locators
//! the page objects use.

#![allow(dead_code)]

use async_trait::async_trait;
use hotel_e2e::{By, Driver, E2eError, E2eResult, ElementState, Locator, Viewport};
use std::sync::{Arc, Mutex, MutexGuard};

/// One stored room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub number: String,
    pub floor: String,
    pub good_view: bool,
}

impl Room {
    pub fn new(number: &str, floor: &str, good_view: bool) -> Self {
        Self {
            number: number.to_string(),
            floor: floor.to_string(),
            good_view,
        }
    }
}

/// How the application answers a valid submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddBehaviour {
    /// Navigate to the room list
    Redirect,
    /// Stay on the form and print a message
    Message,
}

#[derive(Debug)]
struct Database {
    rooms: Vec<Room>,
    add_behaviour: AddBehaviour,
    collapsed_navbar: bool,
    accepts_blank: bool,
}

/// The application under test
#[derive(Debug, Clone)]
pub struct FakeHotel {
    db: Arc<Mutex<Database>>,
}

impl FakeHotel {
    pub fn new() -> Self {
        Self {
            db: Arc::new(Mutex::new(Database {
                rooms: vec![Room::new("101", "1", true), Room::new("204", "2", false)],
                add_behaviour: AddBehaviour::Redirect,
                collapsed_navbar: false,
                accepts_blank: false,
            })),
        }
    }

    /// Answer submissions with a message instead of a redirect
    pub fn with_add_behaviour(self, behaviour: AddBehaviour) -> Self {
        lock(&self.db).add_behaviour = behaviour;
        self
    }

    /// Render the navbar collapsed, as on a narrow window
    pub fn with_collapsed_navbar(self) -> Self {
        lock(&self.db).collapsed_navbar = true;
        self
    }

    /// Drop the `required` check on the room number input
    pub fn accepting_blank_room_numbers(self) -> Self {
        lock(&self.db).accepts_blank = true;
        self
    }

    pub fn rooms(&self) -> Vec<Room> {
        lock(&self.db).rooms.clone()
    }

    /// A new browser pointed at nothing
    pub fn browser(&self) -> FakeBrowser {
        FakeBrowser {
            db: Arc::clone(&self.db),
            tab: Arc::new(Mutex::new(Tab::default())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    #[default]
    Blank,
    Home,
    Rooms,
    Add,
}

#[derive(Debug, Default)]
struct Tab {
    screen: Screen,
    navbar_expanded: bool,
    room_number: String,
    floor_number: String,
    has_view: String,
    message: Option<String>,
    history: Vec<String>,
    closed: bool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// A browser tab on the fake application
#[derive(Debug, Clone)]
pub struct FakeBrowser {
    db: Arc<Mutex<Database>>,
    tab: Arc<Mutex<Tab>>,
}

impl FakeBrowser {
    pub fn history(&self) -> Vec<String> {
        lock(&self.tab).history.clone()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.tab).closed
    }

    fn render(&self, locator: &Locator) -> Vec<ElementState> {
        let db = lock(&self.db);
        let tab = lock(&self.tab);
        if tab.screen == Screen::Blank {
            return Vec::new();
        }

        let navbar_open = !db.collapsed_navbar || tab.navbar_expanded;
        match (locator.by(), locator.value()) {
            (By::XPath, "/html/head/title") => {
                vec![ElementState::new("title").with_text(title_of(tab.screen)).with_visible(false)]
            }
            (By::Id, "navbarNav") => vec![ElementState::new("div")
                .with_text(if navbar_open { "Home\nRooms\nAdd" } else { "" })
                .with_visible(navbar_open)],
            (By::ClassName, "navbar-toggler") => {
                vec![ElementState::new("button").with_visible(db.collapsed_navbar && !tab.navbar_expanded)]
            }
            (By::LinkText, link @ ("Home" | "Rooms" | "Add")) => {
                vec![ElementState::new("a").with_text(link).with_visible(navbar_open)]
            }
            _ => match tab.screen {
                Screen::Home => render_home(locator),
                Screen::Rooms => render_rooms(&db.rooms, locator),
                Screen::Add => render_add(&tab, locator),
                Screen::Blank => Vec::new(),
            },
        }
    }

    fn submit(&self) {
        let mut db = lock(&self.db);
        let mut tab = lock(&self.tab);
        // `required` on the room number input blocks submission in the browser
        if tab.room_number.trim().is_empty() && !db.accepts_blank {
            return;
        }
        let room = Room {
            number: tab.room_number.trim().to_string(),
            floor: tab.floor_number.trim().to_string(),
            good_view: tab.has_view == "Yes",
        };
        let message = format!("Room number {} added", room.number);
        db.rooms.push(room);
        match db.add_behaviour {
            AddBehaviour::Redirect => {
                tab.screen = Screen::Rooms;
                tab.message = None;
            }
            AddBehaviour::Message => tab.message = Some(message),
        }
        tab.room_number.clear();
        tab.floor_number.clear();
    }

    fn field<'a>(tab: &'a mut Tab, name: &str) -> Option<&'a mut String> {
        match name {
            "roomNumber" => Some(&mut tab.room_number),
            "floorNumber" => Some(&mut tab.floor_number),
            "hasView" => Some(&mut tab.has_view),
            _ => None,
        }
    }

    fn stale(locator: &Locator, index: usize) -> E2eError {
        E2eError::StaleElement {
            locator: locator.to_string(),
            index,
        }
    }
}

const fn title_of(screen: Screen) -> &'static str {
    match screen {
        Screen::Blank => "",
        Screen::Home => "AWS App Runner Hotel",
        Screen::Rooms => "Room List",
        Screen::Add => "Add new room",
    }
}

fn render_home(locator: &Locator) -> Vec<ElementState> {
    match (locator.by(), locator.value()) {
        (By::TagName, "h1") => vec![ElementState::new("h1").with_text("Welcome to AWS App Runner Hotel")],
        _ => Vec::new(),
    }
}

fn render_rooms(rooms: &[Room], locator: &Locator) -> Vec<ElementState> {
    match (locator.by(), locator.value()) {
        (By::Css, "table") => vec![ElementState::new("table")],
        (By::Css, "table thead th") => ["Room Number", "Floor Number", "Good View"]
            .into_iter()
            .map(|h| ElementState::new("th").with_text(h))
            .collect(),
        (By::Css, "tbody tr") => rooms
            .iter()
            .map(|r| {
                let (label, badge) = if r.good_view { ("Yes", "bg-success") } else { ("No", "bg-danger") };
                ElementState::new("tr")
                    .with_text(format!("{}\t{}\t{label}", r.number, r.floor))
                    .with_html(format!(
                        "<td>{}</td><td>{}</td><td><span class=\"badge {badge}\">{label}</span></td>",
                        r.number, r.floor
                    ))
            })
            .collect(),
        (By::Css, ".alert-info") => vec![ElementState::new("div")
            .with_text(format!("Rooms stored in database: {}", rooms.len()))],
        _ => Vec::new(),
    }
}

fn render_add(tab: &Tab, locator: &Locator) -> Vec<ElementState> {
    match (locator.by(), locator.value()) {
        (By::Name, "roomNumber") => vec![ElementState::new("input").with_value(&tab.room_number)],
        (By::Name, "floorNumber") => vec![ElementState::new("input").with_value(&tab.floor_number)],
        (By::Name, "hasView") => vec![ElementState::new("select").with_value(&tab.has_view)],
        (By::Css, "button[type=\"submit\"]") => vec![ElementState::new("button").with_text("Add room")],
        (By::Css, ".results p") => tab
            .message
            .iter()
            .map(|m| ElementState::new("p").with_text(m))
            .collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl Driver for FakeBrowser {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut tab = lock(&self.tab);
        tab.history.push(format!("goto:{url}"));
        tab.screen = if url.ends_with("/rooms") {
            Screen::Rooms
        } else if url.ends_with("/add") {
            Screen::Add
        } else {
            Screen::Home
        };
        tab.message = None;
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(title_of(lock(&self.tab).screen).to_string())
    }

    async fn query(&self, locator: &Locator) -> E2eResult<Vec<ElementState>> {
        Ok(self.render(locator))
    }

    async fn click(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        if self.render(locator).get(index).is_none() {
            return Err(Self::stale(locator, index));
        }
        lock(&self.tab).history.push(format!("click:{locator}#{index}"));

        match (locator.by(), locator.value()) {
            (By::LinkText, "Home") => lock(&self.tab).screen = Screen::Home,
            (By::LinkText, "Rooms") => lock(&self.tab).screen = Screen::Rooms,
            (By::LinkText, "Add") => {
                let mut tab = lock(&self.tab);
                tab.screen = Screen::Add;
                tab.message = None;
                tab.room_number.clear();
                tab.floor_number.clear();
                tab.has_view = "Yes".to_string();
            }
            (By::ClassName, "navbar-toggler") => lock(&self.tab).navbar_expanded = true,
            (By::Css, "button[type=\"submit\"]") => self.submit(),
            _ => {}
        }
        Ok(())
    }

    async fn clear(&self, locator: &Locator, index: usize) -> E2eResult<()> {
        let mut tab = lock(&self.tab);
        Self::field(&mut tab, locator.value())
            .ok_or_else(|| Self::stale(locator, index))?
            .clear();
        Ok(())
    }

    async fn send_keys(&self, locator: &Locator, index: usize, text: &str) -> E2eResult<()> {
        let mut tab = lock(&self.tab);
        tab.history.push(format!("send_keys:{locator}#{index}:{text}"));
        let is_select = locator.value() == "hasView";
        if is_select && !matches!(text, "Yes" | "No") {
            return Err(E2eError::script(format!("no option '{text}' in select")));
        }
        let field = Self::field(&mut tab, locator.value()).ok_or_else(|| Self::stale(locator, index))?;
        if is_select {
            *field = text.to_string();
        } else {
            field.push_str(text);
        }
        Ok(())
    }

    async fn set_viewport(&self, viewport: Viewport) -> E2eResult<()> {
        lock(&self.tab).history.push(format!("set_viewport:{viewport}"));
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        Ok(b"\x89PNG".to_vec())
    }

    async fn close(&self) -> E2eResult<()> {
        let mut tab = lock(&self.tab);
        tab.closed = true;
        tab.history.push("close".to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "fake-hotel"
    }
}
