//! Step library for the hotel application.

use super::{StepArgs, StepRegistry};
use crate::pages::{
    AddRoomPage, Expectation, Field, HomeElement, HomePage, RoomListElement, RoomListPage,
};
use crate::result::E2eResult;
use crate::session::Session;
use futures::future::BoxFuture;
use futures::FutureExt;

type StepFuture<'a> = BoxFuture<'a, E2eResult<()>>;

/// Registry with every hotel step bound
pub fn hotel_steps() -> E2eResult<StepRegistry> {
    let mut r = StepRegistry::new();

    // Homepage
    r.given("I am on the homepage", open_homepage)?;
    r.then("I should see the page title \"{title}\"", check_page_title)?;
    r.then(
        "I should see a navbar with \"Home\", \"Rooms\", and \"Add\" options",
        check_navbar,
    )?;
    r.then("I should see the heading \"{heading}\"", check_heading)?;

    // Room list
    r.when("I click on \"Rooms\" in the navbar", open_rooms)?;
    r.then("I should be on the \"{title}\" page", check_rooms_title)?;
    r.then("I should see a table with the list of rooms", check_room_table)?;
    r.then(
        "the table should contain columns for \"Room Number\", \"Floor Number\", and \"Good View\"",
        check_table_columns,
    )?;
    r.then(
        "I should see a room with the room number \"{room_number}\", on floor \"{floor_number}\", with \"{view_status}\" under Good View",
        check_room_details,
    )?;
    r.then(
        "I should see an alert displaying the number of rooms stored in the database",
        check_stored_alert,
    )?;

    // Add room
    r.when("I click on \"Add\" in the navbar", open_add_room)?;
    r.when(
        "I enter \"{room_number}\" in the \"Room number\" field",
        enter_room_number,
    )?;
    r.when(
        "I enter \"{floor_number}\" in the \"Floor number\" field",
        enter_floor_number,
    )?;
    r.when(
        "I select \"{view_status}\" from the \"Good View\" dropdown",
        select_good_view,
    )?;
    r.when("I click the \"Add room\" button", submit_form)?;
    r.when("I leave the \"Room number\" field blank", leave_room_number_blank)?;
    r.then(
        "I should see a form with fields for \"Room number\", \"Floor number\", and \"Good View\"",
        check_form_fields,
    )?;
    r.then("I should see a submit button labeled \"Add room\"", check_submit_button)?;
    r.then("the new room should be added successfully", check_room_added)?;
    r.then("I should be redirected to the \"Rooms\" page", check_redirect)?;
    r.then("the room should not be added", check_room_not_added)?;

    Ok(r)
}

// =============================================================================
// HOMEPAGE
// =============================================================================

fn open_homepage<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { HomePage::new().open(s).await }.boxed()
}

fn check_page_title<'a>(s: &'a Session, a: &'a StepArgs) -> StepFuture<'a> {
    async move {
        let title = a.get("title")?.to_string();
        HomePage::new().verify(s, &HomeElement::Title(title)).await
    }
    .boxed()
}

fn check_navbar<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { HomePage::new().verify(s, &HomeElement::Navbar).await }.boxed()
}

fn check_heading<'a>(s: &'a Session, a: &'a StepArgs) -> StepFuture<'a> {
    async move {
        let heading = a.get("heading")?.to_string();
        HomePage::new().verify(s, &HomeElement::Heading(heading)).await
    }
    .boxed()
}

// =============================================================================
// ROOM LIST
// =============================================================================

fn open_rooms<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { RoomListPage::new().open(s).await }.boxed()
}

fn check_rooms_title<'a>(s: &'a Session, a: &'a StepArgs) -> StepFuture<'a> {
    async move {
        let title = a.get("title")?.to_string();
        RoomListPage::new()
            .verify(s, &RoomListElement::Title(title))
            .await
    }
    .boxed()
}

fn check_room_table<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { RoomListPage::new().verify(s, &RoomListElement::RoomTable).await }.boxed()
}

fn check_table_columns<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { RoomListPage::new().verify_table_columns(s).await }.boxed()
}

fn check_room_details<'a>(s: &'a Session, a: &'a StepArgs) -> StepFuture<'a> {
    async move {
        RoomListPage::new()
            .verify_room_details(
                s,
                a.get("room_number")?,
                a.get("floor_number")?,
                a.get("view_status")?,
            )
            .await
    }
    .boxed()
}

fn check_stored_alert<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { RoomListPage::new().verify_rooms_stored_alert(s).await }.boxed()
}

// =============================================================================
// ADD ROOM
// =============================================================================

fn open_add_room<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { AddRoomPage::new().open(s).await }.boxed()
}

fn enter_room_number<'a>(s: &'a Session, a: &'a StepArgs) -> StepFuture<'a> {
    async move {
        AddRoomPage::new()
            .fill(s, Field::RoomNumber, a.get("room_number")?)
            .await
    }
    .boxed()
}

fn enter_floor_number<'a>(s: &'a Session, a: &'a StepArgs) -> StepFuture<'a> {
    async move {
        AddRoomPage::new()
            .fill(s, Field::FloorNumber, a.get("floor_number")?)
            .await
    }
    .boxed()
}

fn select_good_view<'a>(s: &'a Session, a: &'a StepArgs) -> StepFuture<'a> {
    async move {
        AddRoomPage::new()
            .fill(s, Field::GoodView, a.get("view_status")?)
            .await
    }
    .boxed()
}

fn submit_form<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { AddRoomPage::new().submit(s).await }.boxed()
}

fn leave_room_number_blank<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { AddRoomPage::new().leave_room_number_blank(s).await }.boxed()
}

fn check_form_fields<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { AddRoomPage::new().verify_form_fields(s).await }.boxed()
}

fn check_submit_button<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { AddRoomPage::new().verify_submit_button(s).await }.boxed()
}

fn check_room_added<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { AddRoomPage::new().verify_added(s, Expectation::Either).await }.boxed()
}

fn check_redirect<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { AddRoomPage::new().verify_added(s, Expectation::Redirect).await }.boxed()
}

fn check_room_not_added<'a>(s: &'a Session, _a: &'a StepArgs) -> StepFuture<'a> {
    async move { AddRoomPage::new().verify_not_added(s).await }.boxed()
}
