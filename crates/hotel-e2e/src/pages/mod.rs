//! Page objects for the hotel application.

pub mod add_room;
pub mod homepage;
pub mod rooms;

pub use add_room::{
    AddRoomPage, Expectation, Field, ADD_ROOM_TITLE, NOT_ADDED_SETTLE_MS, SUBMIT_LABEL,
};
pub use homepage::{HomeElement, HomePage, HOME_TITLE, NAV_LINKS, WELCOME_HEADING};
pub use rooms::{RoomListElement, RoomListPage, ViewStatus, ROOM_COLUMNS, ROOM_LIST_TITLE};
